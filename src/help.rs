//! Localized help text, one entry per tab

use crate::config::Language;
use crate::types::Tab;

/// Title of the help popup
pub fn title(language: Language) -> &'static str {
    match language {
        Language::Es => "Ayuda",
        Language::En => "Help",
    }
}

/// Label of the close button
pub fn close_label(language: Language) -> &'static str {
    match language {
        Language::Es => "Cerrar",
        Language::En => "Close",
    }
}

/// Help paragraph for a tab
pub fn text(tab: Tab, language: Language) -> &'static str {
    match language {
        Language::Es => match tab {
            Tab::Calendar => "El Calendario te permite agregar y gestionar eventos. Muévete por los días con las flechas y pulsa [a] para añadir un evento a la fecha seleccionada.",
            Tab::Todo => "La Lista de Tareas te ayuda a organizar tus actividades. Agrega nuevas tareas, asigna emojis con [e] y ordénalas con [J]/[K].",
            Tab::Calculator => "La Calculadora realiza operaciones matemáticas básicas. Escribe números y operadores con el teclado; [Enter] calcula y [c] borra.",
            Tab::PostIt => "Las Notas Post-It son perfectas para apuntes rápidos. Agrega nuevas notas con [a] y cambia su color con [c].",
            Tab::Pomodoro => "El Temporizador Pomodoro te ayuda a gestionar tu tiempo de trabajo y descanso. Inicia, pausa y reinicia según necesites.",
            Tab::Audio => "El Reproductor de Audio te permite cargar y reproducir archivos de audio. Controla la reproducción y el volumen.",
        },
        Language::En => match tab {
            Tab::Calendar => "The Calendar lets you add and manage events. Move between days with the arrow keys and press [a] to add an event to the selected date.",
            Tab::Todo => "The To-do List helps you organize your activities. Add new tasks, tag them with emojis using [e] and reorder them with [J]/[K].",
            Tab::Calculator => "The Calculator performs basic arithmetic. Type numbers and operators on the keyboard; [Enter] evaluates and [c] clears.",
            Tab::PostIt => "Sticky Notes are perfect for quick jottings. Add new notes with [a] and change their color with [c].",
            Tab::Pomodoro => "The Pomodoro Timer helps you manage work and break time. Start, pause and reset as needed.",
            Tab::Audio => "The Audio Player lets you load and play audio files. Control playback and volume.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tab_has_help_in_every_language() {
        for tab in Tab::all() {
            for language in [Language::Es, Language::En] {
                assert!(!text(*tab, language).is_empty());
            }
        }
    }

    #[test]
    fn test_spanish_is_default_wording() {
        assert_eq!(title(Language::default()), "Ayuda");
        assert!(text(Tab::Pomodoro, Language::Es).starts_with("El Temporizador Pomodoro"));
    }
}
