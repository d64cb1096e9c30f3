//! Desk tools
//!
//! One independent state model per tab:
//! - Calendar with per-day events
//! - To-do list
//! - Calculator
//! - Sticky notes
//! - Audio player transport
//!
//! The pomodoro timer lives in `crate::timer`.

pub mod audio;
pub mod calculator;
pub mod calendar;
pub mod notes;
pub mod todo;

pub use audio::{default_backend, AudioPlayer, MediaBackend};
pub use calculator::Calculator;
pub use calendar::Calendar;
pub use notes::{NoteColor, StickyNotes};
pub use todo::TodoList;
