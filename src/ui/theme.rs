//! Theme definitions for deskmate
//!
//! A theme is one accent pair from the palette combined with a dark or light
//! base. Dark mode uses the primary accent, light mode the secondary one.

use crate::tools::NoteColor;
use ratatui::style::{Color, Modifier, Style};

/// One palette entry: primary (600) and secondary (500) accent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accent {
    pub name: &'static str,
    pub primary: Color,
    pub secondary: Color,
}

/// Palette cycled by the theme controller
pub const PALETTE: &[Accent] = &[
    Accent {
        name: "Purple",
        primary: Color::Rgb(147, 51, 234),   // #9333ea
        secondary: Color::Rgb(168, 85, 247), // #a855f7
    },
    Accent {
        name: "Blue",
        primary: Color::Rgb(37, 99, 235),    // #2563eb
        secondary: Color::Rgb(59, 130, 246), // #3b82f6
    },
    Accent {
        name: "Green",
        primary: Color::Rgb(22, 163, 74),   // #16a34a
        secondary: Color::Rgb(34, 197, 94), // #22c55e
    },
    Accent {
        name: "Red",
        primary: Color::Rgb(220, 38, 38),   // #dc2626
        secondary: Color::Rgb(239, 68, 68), // #ef4444
    },
];

/// Palette position and dark-mode flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeController {
    index: usize,
    dark: bool,
}

impl ThemeController {
    pub fn new(dark: bool) -> Self {
        Self { index: 0, dark }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn accent(&self) -> &'static Accent {
        &PALETTE[self.index]
    }

    /// Step to the next palette entry, wrapping around
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % PALETTE.len();
    }

    pub fn toggle_dark(&mut self) -> bool {
        self.dark = !self.dark;
        self.dark
    }

    pub fn theme(&self) -> Theme {
        Theme::new(self.accent(), self.dark)
    }
}

/// Complete theme with all required colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub surface: Color,
    pub fg: Color,
    pub fg_dim: Color,

    // Accent colors
    pub accent: Color,
    pub accent_fg: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // UI element colors
    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Theme {
    pub fn new(accent: &Accent, dark: bool) -> Self {
        if dark {
            Self::dark(accent.primary)
        } else {
            Self::light(accent.secondary)
        }
    }

    /// Dark base (gray-900 / gray-800)
    pub fn dark(accent: Color) -> Self {
        Self {
            bg: Color::Rgb(17, 24, 39),           // #111827
            surface: Color::Rgb(31, 41, 55),      // #1f2937
            fg: Color::Rgb(255, 255, 255),
            fg_dim: Color::Rgb(209, 213, 219),    // #d1d5db

            accent,
            accent_fg: Color::Rgb(255, 255, 255),

            success: Color::Rgb(74, 222, 128),    // #4ade80
            warning: Color::Rgb(250, 204, 21),    // #facc15
            error: Color::Rgb(248, 113, 113),     // #f87171

            border: Color::Rgb(55, 65, 81),       // #374151
            border_focused: accent,
            selection_bg: Color::Rgb(55, 65, 81), // #374151
            selection_fg: Color::Rgb(255, 255, 255),
        }
    }

    /// Light base (gray-100 / white)
    pub fn light(accent: Color) -> Self {
        Self {
            bg: Color::Rgb(243, 244, 246),          // #f3f4f6
            surface: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(31, 41, 55),             // #1f2937
            fg_dim: Color::Rgb(75, 85, 99),         // #4b5563

            accent,
            accent_fg: Color::Rgb(255, 255, 255),

            success: Color::Rgb(22, 163, 74),       // #16a34a
            warning: Color::Rgb(202, 138, 4),       // #ca8a04
            error: Color::Rgb(220, 38, 38),         // #dc2626

            border: Color::Rgb(209, 213, 219),      // #d1d5db
            border_focused: accent,
            selection_bg: Color::Rgb(229, 231, 235), // #e5e7eb
            selection_fg: Color::Rgb(17, 24, 39),
        }
    }

    // Style helpers for common UI patterns

    /// Background of panels
    pub fn block_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.surface)
    }

    /// Default text style
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg).bg(self.surface)
    }

    /// Dimmed text style
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.surface)
    }

    /// Title/header style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Header bar filled with the accent
    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.accent_fg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected item style
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style (unfocused)
    pub fn border(&self) -> Style {
        Style::default().fg(self.border).bg(self.surface)
    }

    /// Border style (focused)
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused).bg(self.surface)
    }

    /// Tab style (inactive)
    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Tab style (active)
    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.accent_fg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Success message style
    pub fn success(&self) -> Style {
        Style::default().fg(self.success).bg(self.bg)
    }

    /// Warning message style
    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning).bg(self.surface)
    }

    /// Error message style
    pub fn error(&self) -> Style {
        Style::default().fg(self.error).bg(self.bg)
    }

    /// Finished to-do items
    pub fn done(&self) -> Style {
        Style::default()
            .fg(self.fg_dim)
            .bg(self.surface)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    /// Sticky note body
    pub fn note(&self, color: NoteColor) -> Style {
        let bg = match color {
            NoteColor::Yellow => Color::Rgb(254, 240, 138), // #fef08a
            NoteColor::Pink => Color::Rgb(251, 207, 232),   // #fbcfe8
            NoteColor::Blue => Color::Rgb(191, 219, 254),   // #bfdbfe
            NoteColor::Green => Color::Rgb(187, 247, 208),  // #bbf7d0
            NoteColor::Orange => Color::Rgb(254, 215, 170), // #fed7aa
        };
        Style::default().fg(Color::Rgb(31, 41, 55)).bg(bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycle_returns_to_start() {
        let mut ctl = ThemeController::default();
        for _ in 0..PALETTE.len() {
            ctl.advance();
        }
        assert_eq!(ctl.index(), 0);

        ctl.advance();
        ctl.advance();
        let start = ctl.index();
        for _ in 0..PALETTE.len() {
            ctl.advance();
        }
        assert_eq!(ctl.index(), start);
    }

    #[test]
    fn test_dark_mode_picks_primary_accent() {
        let mut ctl = ThemeController::new(true);
        assert_eq!(ctl.theme().accent, PALETTE[0].primary);
        assert_eq!(ctl.theme().bg, Color::Rgb(17, 24, 39));

        assert!(!ctl.toggle_dark());
        assert_eq!(ctl.theme().accent, PALETTE[0].secondary);
        assert_eq!(ctl.theme().bg, Color::Rgb(243, 244, 246));
    }

    #[test]
    fn test_advance_keeps_dark_flag() {
        let mut ctl = ThemeController::new(true);
        ctl.advance();
        assert!(ctl.is_dark());
        assert_eq!(ctl.accent().name, "Blue");
    }
}
