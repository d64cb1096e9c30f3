//! Application state and event handling
//!
//! This is the core of deskmate, managing:
//! - The active tab, palette and dark mode
//! - The pomodoro timer and its one-second tick schedule
//! - Event handling (keyboard input) for every tool
//! - Write-through persistence of everything that survives a restart

use crate::config::Config;
use crate::store::{read_bool, PreferenceStore, KEY_ACTIVE_TAB, KEY_DARK_MODE};
use crate::timer::{PomodoroTimer, Ticker};
use crate::tools::{AudioPlayer, Calculator, Calendar, MediaBackend, StickyNotes, TodoList};
use crate::types::Tab;
use crate::ui::theme::{Theme, ThemeController};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How long flash messages stay visible
const FLASH_DURATION: Duration = Duration::from_secs(3);

/// Longest accepted input line
const MAX_INPUT_LEN: usize = 200;

/// Main application state
pub struct App {
    // Core state
    pub should_quit: bool,
    pub active_tab: Tab,
    pub config: Config,
    pub theme_ctl: ThemeController,
    pub theme: Theme,
    store: Box<dyn PreferenceStore>,

    // Pomodoro timer and its tick schedule
    pub timer: PomodoroTimer,
    ticker: Option<Ticker>,

    // Tools
    pub calendar: Calendar,
    pub todos: TodoList,
    pub calculator: Calculator,
    pub notes: StickyNotes,
    pub audio: AudioPlayer,

    // Popup state
    pub popup: PopupState,

    // Flash message (temporary feedback)
    pub flash_message: Option<(String, bool, Instant)>, // (message, is_error, timestamp)

    // Latest time handed in by the event loop
    clock: Instant,
}

/// Popup overlay state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupState {
    None,
    Help,
    Input(InputPrompt),
}

/// Single-line text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    pub target: InputTarget,
    pub buffer: String,
}

/// What a committed prompt feeds into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    CalendarEvent,
    TodoItem,
    NewNote,
    EditNote,
    AudioPath,
}

impl InputTarget {
    pub fn title(&self) -> &'static str {
        match self {
            InputTarget::CalendarEvent => "New Event",
            InputTarget::TodoItem => "New Task",
            InputTarget::NewNote => "New Note",
            InputTarget::EditNote => "Edit Note",
            InputTarget::AudioPath => "Open Audio File",
        }
    }
}

/// Application state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowHelp,
    Editing,
}

impl App {
    /// Create a new App, restoring persisted state from `store`
    pub fn new(
        config: Config,
        store: Box<dyn PreferenceStore>,
        backend: Box<dyn MediaBackend>,
        today: NaiveDate,
        now: Instant,
    ) -> Self {
        let active_tab = store
            .read_string(KEY_ACTIVE_TAB)
            .and_then(|id| Tab::from_id(&id))
            .unwrap_or_default();
        let dark = read_bool(store.as_ref(), KEY_DARK_MODE).unwrap_or(false);
        let theme_ctl = ThemeController::new(dark);

        let timer = PomodoroTimer::load(store.as_ref(), config.timer.duration_minutes);
        let calendar = Calendar::load(store.as_ref(), today);
        let todos = TodoList::load(store.as_ref());
        let notes = StickyNotes::load(store.as_ref());

        info!(
            "Restored state: tab={}, dark={}, timer={:?}",
            active_tab.id(),
            dark,
            timer.state()
        );

        let mut app = Self {
            should_quit: false,
            active_tab,
            config,
            theme: theme_ctl.theme(),
            theme_ctl,
            store,

            timer,
            ticker: None,

            calendar,
            todos,
            calculator: Calculator::default(),
            notes,
            audio: AudioPlayer::new(backend),

            popup: PopupState::None,
            flash_message: None,
            clock: now,
        };

        // A timer that was running when the app closed keeps running
        app.sync_ticker(now);
        app
    }

    /// Get current app state
    pub fn state(&self) -> AppState {
        match &self.popup {
            PopupState::None => AppState::Normal,
            PopupState::Help => AppState::ShowHelp,
            PopupState::Input(_) => AppState::Editing,
        }
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    /// Whether the one-second tick schedule is armed
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Time until the next timer tick, if one is scheduled
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.ticker.as_ref().map(|t| t.until_next(now))
    }

    // === SHELL TRANSITIONS ===

    pub fn select_tab(&mut self, tab: Tab) {
        if self.active_tab == tab {
            return;
        }
        debug!("Switching to tab {}", tab.id());
        self.active_tab = tab;
        let result = self.store.write_string(KEY_ACTIVE_TAB, tab.id());
        self.persist("active tab", result);
    }

    pub fn toggle_dark_mode(&mut self) {
        let dark = self.theme_ctl.toggle_dark();
        self.theme = self.theme_ctl.theme();
        let result = self.store.write_string(KEY_DARK_MODE, &dark.to_string());
        self.persist("dark mode", result);
    }

    /// Next palette entry. Not persisted.
    pub fn advance_palette(&mut self) {
        self.theme_ctl.advance();
        self.theme = self.theme_ctl.theme();
    }

    pub fn toggle_help(&mut self) {
        self.popup = match self.popup {
            PopupState::Help => PopupState::None,
            _ => PopupState::Help,
        };
    }

    // === TIMER TRANSITIONS ===

    pub fn start_timer(&mut self, now: Instant) {
        if self.timer.start() {
            info!("Pomodoro started at {:?}", self.timer.state());
            self.timer_changed(now);
        }
    }

    pub fn pause_timer(&mut self, now: Instant) {
        if self.timer.pause() {
            info!("Pomodoro paused at {:?}", self.timer.state());
            self.timer_changed(now);
        }
    }

    pub fn reset_timer(&mut self, now: Instant) {
        if self.timer.reset() {
            info!("Pomodoro reset to {}:00", self.timer.duration_minutes());
            self.timer_changed(now);
        }
    }

    pub fn toggle_timer(&mut self, now: Instant) {
        if self.timer.is_running() {
            self.pause_timer(now);
        } else {
            self.start_timer(now);
        }
    }

    fn timer_changed(&mut self, now: Instant) {
        let result = self.timer.save(self.store.as_mut());
        self.persist("timer", result);
        self.sync_ticker(now);
    }

    /// Acquire the tick schedule while running, release it otherwise
    fn sync_ticker(&mut self, now: Instant) {
        match (self.timer.is_running(), self.ticker.is_some()) {
            (true, false) => {
                debug!("Tick schedule armed");
                self.ticker = Some(Ticker::start(now));
            }
            (false, true) => {
                debug!("Tick schedule released");
                self.ticker = None;
            }
            _ => {}
        }
    }

    /// Periodic update, called once per loop iteration
    pub fn update(&mut self, now: Instant) {
        self.clock = now;
        let due = self.ticker.as_mut().map(|t| t.due(now)).unwrap_or(0);
        for _ in 0..due {
            if !self.timer.tick() {
                break;
            }
            let result = self.timer.save(self.store.as_mut());
            self.persist("timer", result);

            if !self.timer.is_running() {
                info!("Pomodoro finished");
                self.show_flash("Pomodoro finished!", false);
                break;
            }
        }
        self.sync_ticker(now);

        self.audio.update(now);

        if let Some((_, _, instant)) = &self.flash_message {
            if now.saturating_duration_since(*instant) >= FLASH_DURATION {
                self.flash_message = None;
            }
        }
    }

    // === INPUT ===

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        self.clock = now;
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match self.state() {
            AppState::ShowHelp => self.handle_help_key(key),
            AppState::Editing => self.handle_input_key(key),
            AppState::Normal => self.handle_normal_key(key, now),
        }
        Ok(())
    }

    /// Handle key in normal state
    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) {
        // Global keys (work in all tabs). Digits belong to the calculator
        // while it is shown.
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(c @ '1'..='6') if self.active_tab != Tab::Calculator => {
                self.select_tab(Tab::from_index(c as usize - '1' as usize));
                return;
            }
            KeyCode::Tab => {
                self.select_tab(self.active_tab.next());
                return;
            }
            KeyCode::BackTab => {
                self.select_tab(self.active_tab.prev());
                return;
            }
            KeyCode::Char('p') => {
                self.advance_palette();
                return;
            }
            KeyCode::Char('m') => {
                self.toggle_dark_mode();
                return;
            }
            KeyCode::Char('?') => {
                self.toggle_help();
                return;
            }
            _ => {}
        }

        // Tab-specific handling
        match self.active_tab {
            Tab::Calendar => self.handle_calendar_key(key),
            Tab::Todo => self.handle_todo_key(key),
            Tab::Calculator => self.handle_calculator_key(key),
            Tab::PostIt => self.handle_notes_key(key),
            Tab::Pomodoro => self.handle_pomodoro_key(key, now),
            Tab::Audio => self.handle_audio_key(key, now),
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            self.popup = PopupState::None;
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let PopupState::Input(prompt) = &mut self.popup else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => {
                if prompt.buffer.chars().count() < MAX_INPUT_LEN {
                    prompt.buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                prompt.buffer.pop();
            }
            KeyCode::Esc => {
                self.popup = PopupState::None;
            }
            KeyCode::Enter => {
                let prompt = prompt.clone();
                self.popup = PopupState::None;
                self.commit_input(prompt);
            }
            _ => {}
        }
    }

    fn open_prompt(&mut self, target: InputTarget, initial: &str) {
        self.popup = PopupState::Input(InputPrompt {
            target,
            buffer: initial.to_string(),
        });
    }

    fn commit_input(&mut self, prompt: InputPrompt) {
        let text = prompt.buffer.as_str();
        match prompt.target {
            InputTarget::CalendarEvent => {
                if self.calendar.add_event(text) {
                    self.save_calendar();
                }
            }
            InputTarget::TodoItem => {
                if self.todos.add(text) {
                    self.save_todos();
                }
            }
            InputTarget::NewNote => {
                if self.notes.add(text) {
                    self.save_notes();
                }
            }
            InputTarget::EditNote => {
                if self.notes.edit_selected(text) {
                    self.save_notes();
                }
            }
            InputTarget::AudioPath => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                match self.audio.load(expand_home(text)) {
                    Ok(()) => {
                        let name = self.audio.source_name().unwrap_or_default();
                        self.show_flash(&format!("Loaded {}", name), false);
                    }
                    Err(e) => {
                        error!("Failed to load audio file {:?}: {:#}", text, e);
                        self.show_flash(&format!("{:#}", e), true);
                    }
                }
            }
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.calendar.move_days(-1),
            KeyCode::Char('l') | KeyCode::Right => self.calendar.move_days(1),
            KeyCode::Char('k') | KeyCode::Up => self.calendar.move_days(-7),
            KeyCode::Char('j') | KeyCode::Down => self.calendar.move_days(7),
            KeyCode::Char('[') | KeyCode::Char('<') | KeyCode::PageUp => {
                self.calendar.move_months(-1)
            }
            KeyCode::Char(']') | KeyCode::Char('>') | KeyCode::PageDown => {
                self.calendar.move_months(1)
            }
            KeyCode::Char('t') => {
                self.calendar.selected = chrono::Local::now().date_naive();
            }
            KeyCode::Char('a') | KeyCode::Enter => self.open_prompt(InputTarget::CalendarEvent, ""),
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.calendar.remove_last_event().is_some() {
                    self.save_calendar();
                }
            }
            _ => {}
        }
    }

    fn handle_todo_key(&mut self, key: KeyEvent) {
        let changed = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.todos.select_next();
                false
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.todos.select_prev();
                false
            }
            KeyCode::Char('a') => {
                self.open_prompt(InputTarget::TodoItem, "");
                false
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.todos.toggle_done(),
            KeyCode::Char('d') | KeyCode::Delete => self.todos.remove_selected().is_some(),
            KeyCode::Char('e') => self.todos.cycle_emoji(),
            KeyCode::Char('K') => self.todos.move_up(),
            KeyCode::Char('J') => self.todos.move_down(),
            _ => false,
        };
        if changed {
            self.save_todos();
        }
    }

    fn handle_calculator_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.calculator.press(c);
            }
            KeyCode::Enter => self.calculator.equals(),
            KeyCode::Backspace => self.calculator.backspace(),
            KeyCode::Esc | KeyCode::Delete => self.calculator.clear(),
            _ => {}
        }
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        let changed = match key.code {
            KeyCode::Char('j') | KeyCode::Char('l') | KeyCode::Down | KeyCode::Right => {
                self.notes.select_next();
                false
            }
            KeyCode::Char('k') | KeyCode::Char('h') | KeyCode::Up | KeyCode::Left => {
                self.notes.select_prev();
                false
            }
            KeyCode::Char('a') => {
                self.open_prompt(InputTarget::NewNote, "");
                false
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(text) = self.notes.selected_text().map(str::to_string) {
                    self.open_prompt(InputTarget::EditNote, &text);
                }
                false
            }
            KeyCode::Char('c') => self.notes.cycle_color(),
            KeyCode::Char('d') | KeyCode::Delete => self.notes.remove_selected().is_some(),
            _ => false,
        };
        if changed {
            self.save_notes();
        }
    }

    fn handle_pomodoro_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_timer(now),
            KeyCode::Char('s') => self.start_timer(now),
            KeyCode::Char('x') => self.pause_timer(now),
            KeyCode::Char('r') => self.reset_timer(now),
            _ => {}
        }
    }

    fn handle_audio_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('o') => {
                let current = self
                    .audio
                    .source()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.open_prompt(InputTarget::AudioPath, &current);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if !self.audio.toggle_play(now) {
                    self.show_flash("No audio file loaded, press [o] to open one", true);
                }
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                if let Err(e) = self.audio.seek_by(now, forward, crate::tools::audio::SEEK_STEP) {
                    error!("Seek failed: {:#}", e);
                    self.show_flash(&format!("{:#}", e), true);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                self.audio.change_volume(crate::tools::audio::VOLUME_STEP)
            }
            KeyCode::Char('-') | KeyCode::Down => {
                self.audio.change_volume(-crate::tools::audio::VOLUME_STEP)
            }
            KeyCode::Char('x') => self.audio.toggle_mute(),
            _ => {}
        }
    }

    // === PERSISTENCE ===

    fn save_calendar(&mut self) {
        let result = self.calendar.save(self.store.as_mut());
        self.persist("calendar", result);
    }

    fn save_todos(&mut self) {
        let result = self.todos.save(self.store.as_mut());
        self.persist("to-do list", result);
    }

    fn save_notes(&mut self) {
        let result = self.notes.save(self.store.as_mut());
        self.persist("notes", result);
    }

    /// Report a failed write without interrupting the user
    fn persist(&mut self, what: &str, result: Result<()>) {
        if let Err(e) = result {
            error!("Failed to save {}: {:#}", what, e);
            self.show_flash(&format!("Could not save {}", what), true);
        }
    }

    /// Show a flash message, stamped with the latest loop time
    pub fn show_flash(&mut self, message: &str, is_error: bool) {
        self.flash_message = Some((message.into(), is_error, self.clock));
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
