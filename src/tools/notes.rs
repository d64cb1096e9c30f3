//! Sticky notes

use crate::store::{read_json, write_json, PreferenceStore, KEY_NOTES};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    Orange,
}

impl NoteColor {
    pub fn all() -> &'static [NoteColor] {
        &[
            NoteColor::Yellow,
            NoteColor::Pink,
            NoteColor::Blue,
            NoteColor::Green,
            NoteColor::Orange,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyNote {
    pub text: String,
    #[serde(default)]
    pub color: NoteColor,
}

#[derive(Debug, Clone, Default)]
pub struct StickyNotes {
    pub notes: Vec<StickyNote>,
    pub selected: usize,
}

impl StickyNotes {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            notes: read_json(store, KEY_NOTES).unwrap_or_default(),
            selected: 0,
        }
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        write_json(store, KEY_NOTES, &self.notes)
    }

    /// Add a note and select it. Each new note takes the color after the
    /// previous note's, so neighbours differ.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let color = self
            .notes
            .last()
            .map(|n| n.color.next())
            .unwrap_or_default();
        self.notes.push(StickyNote {
            text: text.to_string(),
            color,
        });
        self.selected = self.notes.len() - 1;
        true
    }

    /// Replace the text of the selected note. Blank text deletes it.
    pub fn edit_selected(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return self.remove_selected().is_some();
        }
        match self.notes.get_mut(self.selected) {
            Some(note) => {
                note.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.notes.get(self.selected).map(|n| n.text.as_str())
    }

    pub fn cycle_color(&mut self) -> bool {
        match self.notes.get_mut(self.selected) {
            Some(note) => {
                note.color = note.color.next();
                true
            }
            None => false,
        }
    }

    pub fn remove_selected(&mut self) -> Option<StickyNote> {
        if self.selected >= self.notes.len() {
            return None;
        }
        let note = self.notes.remove(self.selected);
        self.selected = self.selected.min(self.notes.len().saturating_sub(1));
        Some(note)
    }

    pub fn select_next(&mut self) {
        if self.selected < self.notes.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
