//! Main rendering module
//!
//! Handles rendering the complete UI including:
//! - Header with title and tab bar
//! - Active tab content
//! - Popups and overlays
//! - Status bar

use crate::app::{App, PopupState};
use crate::help;
use crate::timer::TimerStatus;
use crate::types::{format_clock, Tab};
use crate::ui::theme::{Theme, PALETTE};
use crate::ui::widgets;
use chrono::{Datelike, Local};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use std::time::{Duration, Instant};

/// Main render function - entry point for all UI rendering
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let theme = &app.theme;

    frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

    // Main layout: header, content, status bar
    let layout = Layout::vertical([
        Constraint::Length(3), // Header + tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_header(frame, app, layout[0]);
    render_tab_content(frame, app, layout[1]);
    render_status_bar(frame, app, layout[2]);
    render_popups(frame, app, area);
}

/// Render header with title and tab bar
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let title_area = Rect { height: 1, ..area };
    let mode = if app.theme_ctl.is_dark() { "☾ dark" } else { "☀ light" };
    let right = format!(
        "{} {}/{} · {} ",
        app.theme_ctl.accent().name,
        app.theme_ctl.index() + 1,
        PALETTE.len(),
        mode
    );

    let title_line = Line::from(vec![
        Span::styled(" deskmate", theme.header()),
        Span::styled(
            format!(
                "{:>width$}",
                right,
                width = (area.width as usize).saturating_sub(9)
            ),
            theme.header(),
        ),
    ]);
    frame.render_widget(Paragraph::new(title_line).style(theme.header()), title_area);

    // Tab bar
    let tab_titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let style = if app.active_tab == *tab {
                theme.tab_active()
            } else {
                theme.tab_inactive()
            };
            let mut label = format!(" [{}] {} ", i + 1, tab.label());
            if *tab == Tab::Pomodoro && app.timer.is_running() {
                let state = app.timer.state();
                label = format!(" [{}] {} {}:{:02} ", i + 1, tab.label(), state.minutes, state.seconds);
            }
            Line::styled(label, style)
        })
        .collect();

    let tabs = Tabs::new(tab_titles)
        .select(app.active_tab.index())
        .divider(" ")
        .style(Style::default().bg(theme.bg));

    let tabs_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    frame.render_widget(tabs, tabs_area);
}

/// Render the active tab's content
fn render_tab_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.active_tab {
        Tab::Calendar => render_calendar_tab(frame, app, area),
        Tab::Todo => render_todo_tab(frame, app, area),
        Tab::Calculator => render_calculator_tab(frame, app, area),
        Tab::PostIt => render_notes_tab(frame, app, area),
        Tab::Pomodoro => render_pomodoro_tab(frame, app, area),
        Tab::Audio => render_audio_tab(frame, app, area),
    }
}

/// Render status bar with keybindings
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let hints = match app.active_tab {
        Tab::Calendar => " [←→↑↓] Move  [[/]] Month  [a] Add  [d] Delete  [t] Today",
        Tab::Todo => " [j/k] Navigate  [a] Add  [Space] Done  [e] Emoji  [J/K] Reorder  [d] Delete",
        Tab::Calculator => " [0-9 . + - * /] Input  [Enter] =  [Bksp] Erase  [c] Clear  [Tab] Next tab",
        Tab::PostIt => " [←→] Select  [a] Add  [e] Edit  [c] Color  [d] Delete",
        Tab::Pomodoro => " [Space] Start/Pause  [r] Reset",
        Tab::Audio => " [o] Open  [Space] Play/Pause  [←→] Seek  [+/-] Volume  [x] Mute",
    };
    let global = "[p] Palette  [m] Mode  [?] Help  [q] Quit";

    // Narrow terminals keep the tab hints and drop the global ones
    let fits = hints.chars().count() + global.chars().count() + 2 <= area.width as usize;
    widgets::render_status_bar(frame, hints, if fits { global } else { "" }, theme, area);
}

/// Render popups if active
fn render_popups(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let language = app.config.language;

    match &app.popup {
        PopupState::None => {}

        PopupState::Help => {
            widgets::render_help_popup(
                frame,
                help::title(language),
                help::text(app.active_tab, language),
                help::close_label(language),
                theme,
                area,
            );
        }

        PopupState::Input(prompt) => {
            widgets::render_input_popup(frame, prompt.target.title(), &prompt.buffer, theme, area);
        }
    }

    // Flash message (success/error feedback)
    if let Some((msg, is_error, _)) = &app.flash_message {
        widgets::render_flash_message(frame, msg, *is_error, theme, area);
    }
}

/// Bordered panel with the theme background, returns the inner area
fn panel(frame: &mut Frame, title: &str, focused: bool, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .style(theme.block_style())
        .title(format!(" {} ", title))
        .title_style(if focused { theme.title() } else { theme.text_dim() })
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

// === TAB RENDERERS ===

/// Calendar tab: month grid and the selected day's events
fn render_calendar_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let calendar = &app.calendar;
    let today = Local::now().date_naive();

    let panels = Layout::horizontal([Constraint::Length(38), Constraint::Min(20)]).split(area);

    let inner = panel(frame, &calendar.month_title(), true, theme, panels[0]);

    let header = Row::new(
        ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
            .iter()
            .map(|d| Cell::from(*d).style(theme.title())),
    );

    let rows: Vec<Row> = calendar
        .month_grid()
        .iter()
        .map(|week| {
            Row::new(week.iter().map(|day| match day {
                None => Cell::from(""),
                Some(date) => {
                    let marker = if calendar.has_events(*date) { "•" } else { " " };
                    let text = format!("{:>2}{}", date.day(), marker);
                    let style = if *date == calendar.selected {
                        theme.selected()
                    } else if *date == today {
                        theme.title()
                    } else {
                        theme.text()
                    };
                    Cell::from(text).style(style)
                }
            }))
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(4); 7])
        .header(header)
        .column_spacing(1);
    frame.render_widget(table, inner);

    let title = calendar.selected.format("%A, %d %B %Y").to_string();
    let inner = panel(frame, &title, false, theme, panels[1]);

    let events = calendar.events_on(calendar.selected);
    if events.is_empty() {
        let empty = Paragraph::new("No events · press [a] to add one")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let items: Vec<ListItem> = events
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(" • ", theme.title()),
                Span::styled(e.as_str(), theme.text()),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

/// To-do tab: task list
fn render_todo_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let todos = &app.todos;

    let title = format!("To-do · {} open / {}", todos.remaining(), todos.items.len());
    let inner = panel(frame, &title, true, theme, area);

    if todos.items.is_empty() {
        let empty = Paragraph::new("Nothing to do · press [a] to add a task")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let items: Vec<ListItem> = todos
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let check = if item.done { "[x] " } else { "[ ] " };
            let emoji = item.emoji.as_deref().map(|e| format!("{} ", e)).unwrap_or_default();
            let text_style = if i == todos.selected {
                theme.selected()
            } else if item.done {
                theme.done()
            } else {
                theme.text()
            };

            ListItem::new(Line::from(vec![
                Span::styled(check, theme.title()),
                Span::raw(emoji),
                Span::styled(item.text.as_str(), text_style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}

/// Calculator tab: display and keypad legend
fn render_calculator_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let calc = &app.calculator;

    let box_area = widgets::centered_rect(36, 14, area);
    let inner = panel(frame, "Calculator", true, theme, box_area);

    let pending = calc
        .pending()
        .map(|(lhs, op)| format!("{} {}", lhs, op.symbol()))
        .or_else(|| calc.history.clone())
        .unwrap_or_default();

    let display_style = if calc.display() == "Error" {
        theme.error().add_modifier(Modifier::BOLD)
    } else {
        theme.title()
    };

    let mut lines = vec![
        Line::styled(pending, theme.text_dim()).alignment(Alignment::Right),
        Line::styled(calc.display().to_string(), display_style).alignment(Alignment::Right),
        Line::raw(""),
    ];

    for row in [["7", "8", "9", "÷"], ["4", "5", "6", "×"], ["1", "2", "3", "-"], ["0", ".", "=", "+"]] {
        let spans: Vec<Span> = row
            .iter()
            .map(|key| Span::styled(format!("  {:^3}  ", key), theme.text()))
            .collect();
        lines.push(Line::from(spans).alignment(Alignment::Center));
        lines.push(Line::raw(""));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Notes tab: colored note cards in a grid
fn render_notes_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let notes = &app.notes;

    let title = format!("Notes ({})", notes.notes.len());
    let inner = panel(frame, &title, true, theme, area);

    if notes.notes.is_empty() {
        let empty = Paragraph::new("No notes · press [a] to add one")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    const CARD_WIDTH: u16 = 26;
    const CARD_HEIGHT: u16 = 7;
    let columns = (inner.width / CARD_WIDTH).max(1) as usize;
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;

    // Scroll so the selected card is always on screen
    let selected_row = notes.selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    for (i, note) in notes.notes.iter().enumerate() {
        let row = i / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let card = Rect {
            x: inner.x + (i % columns) as u16 * CARD_WIDTH,
            y: inner.y + (row - first_row) as u16 * CARD_HEIGHT,
            width: (CARD_WIDTH - 1).min(inner.width),
            height: CARD_HEIGHT - 1,
        };

        let style = theme.note(note.color);
        let border = if i == notes.selected {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            style
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .style(style);

        let body = Paragraph::new(note.text.as_str())
            .block(block)
            .style(style)
            .wrap(Wrap { trim: true });
        frame.render_widget(body, card);
    }
}

/// Pomodoro tab: countdown and progress
fn render_pomodoro_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let timer = &app.timer;
    let state = timer.state();

    let box_area = widgets::centered_rect(44, 11, area);
    let inner = panel(frame, "Pomodoro", true, theme, box_area);

    let status_style = match timer.status() {
        TimerStatus::Running => theme.success(),
        TimerStatus::Idle => theme.text_dim(),
        TimerStatus::Finished => theme.warning(),
    };

    let clock = format!("{:02}:{:02}", state.minutes, state.seconds);
    let lines = vec![
        Line::raw(""),
        Line::styled(clock, theme.title().add_modifier(Modifier::BOLD)).alignment(Alignment::Center),
        Line::raw(""),
        Line::styled(timer.status().label(), status_style).alignment(Alignment::Center),
        Line::raw(""),
    ];

    let layout = Layout::vertical([Constraint::Length(5), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(Paragraph::new(lines), layout[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent).bg(theme.border))
        .ratio(timer.progress())
        .label(format!("{} min session", timer.duration_minutes()));
    frame.render_widget(gauge, layout[1]);
}

/// Audio tab: transport state
fn render_audio_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let audio = &app.audio;
    let now = Instant::now();

    let box_area = widgets::centered_rect(60, 11, area);
    let inner = panel(frame, "Audio Player", true, theme, box_area);

    let Some(name) = audio.source_name() else {
        let empty = Paragraph::new(vec![
            Line::raw(""),
            Line::styled("No file loaded", theme.text_dim()),
            Line::styled("Press [o] to open an audio file", theme.text_dim()),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    };

    let position = audio.position(now);
    let state = if audio.is_playing() { "▶ Playing" } else { "⏸ Paused" };
    let time = match audio.duration() {
        Some(total) => format!("{} / {}", format_clock(position), format_clock(total)),
        None => format_clock(position),
    };

    let volume = if audio.is_muted() {
        format!("🔇 muted ({:.0}%)", audio.volume() * 100.0)
    } else {
        format!(
            "🔊 {} {:.0}%",
            widgets::progress_bar(f64::from(audio.volume()), 10),
            audio.volume() * 100.0
        )
    };

    let lines = vec![
        Line::styled(name, theme.title()).alignment(Alignment::Center),
        Line::raw(""),
        Line::from(vec![
            Span::styled(state, theme.text()),
            Span::raw("   "),
            Span::styled(time, theme.text_dim()),
        ])
        .alignment(Alignment::Center),
        Line::raw(""),
    ];

    let layout = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(inner);
    frame.render_widget(Paragraph::new(lines), layout[0]);

    let ratio = match audio.duration() {
        Some(total) if total > Duration::ZERO => position.as_secs_f64() / total.as_secs_f64(),
        _ => 0.0,
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent).bg(theme.border))
        .ratio(ratio.clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, layout[1]);

    let volume_widget = Paragraph::new(volume)
        .style(theme.text())
        .alignment(Alignment::Center);
    frame.render_widget(volume_widget, layout[3]);
}
