//! Core data types for deskmate
//!
//! Shared enums and small helpers used by the shell, the widgets and the UI.

use std::time::Duration;

/// Application tabs, one per widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Calendar,
    Todo,
    Calculator,
    PostIt,
    Pomodoro,
    Audio,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Calendar,
            Tab::Todo,
            Tab::Calculator,
            Tab::PostIt,
            Tab::Pomodoro,
            Tab::Audio,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Calendar => 0,
            Tab::Todo => 1,
            Tab::Calculator => 2,
            Tab::PostIt => 3,
            Tab::Pomodoro => 4,
            Tab::Audio => 5,
        }
    }

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Tab::Calendar,
            1 => Tab::Todo,
            2 => Tab::Calculator,
            3 => Tab::PostIt,
            4 => Tab::Pomodoro,
            5 => Tab::Audio,
            _ => Tab::Calendar,
        }
    }

    /// Identifier used in the preference store
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Calendar => "calendar",
            Tab::Todo => "todo",
            Tab::Calculator => "calculator",
            Tab::PostIt => "postit",
            Tab::Pomodoro => "pomodoro",
            Tab::Audio => "audio",
        }
    }

    /// Parse a stored identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Tab::all().iter().copied().find(|tab| tab.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Calendar => "Calendar",
            Tab::Todo => "To-do",
            Tab::Calculator => "Calculator",
            Tab::PostIt => "Notes",
            Tab::Pomodoro => "Pomodoro",
            Tab::Audio => "Audio",
        }
    }

    pub fn next(&self) -> Self {
        Tab::from_index((self.index() + 1) % Tab::all().len())
    }

    pub fn prev(&self) -> Self {
        let len = Tab::all().len();
        Tab::from_index((self.index() + len - 1) % len)
    }
}

// Helper functions

/// Format a duration as `m:ss`, or `h:mm:ss` past one hour
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
