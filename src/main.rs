//! deskmate - a desk of small productivity tools in the terminal
//!
//! Features:
//! - Calendar with per-day events
//! - To-do list with emoji tags
//! - Calculator
//! - Sticky notes
//! - Pomodoro timer that keeps counting across restarts
//! - Audio player
//!
//! Usage: deskmate [--reset-timer]

mod app;
mod config;
mod help;
mod store;
mod timer;
mod tools;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use store::{FileStore, MemoryStore, PreferenceStore};
use tracing::{info, warn};

/// Upper bound on how long the loop waits for input
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("deskmate {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let reset_timer = args.iter().any(|a| a == "--reset-timer");

    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    // Run the application
    let result = run_app(reset_timer);

    if let Err(e) = result {
        tracing::error!("Fatal: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"deskmate - productivity tools in the terminal

USAGE:
    deskmate [OPTIONS]

OPTIONS:
        --reset-timer    Discard the saved pomodoro state
    -h, --help           Print help information
    -v, --version        Print version information

KEYBINDINGS:
    1-6 / Tab        Switch tabs
    p                Next color palette
    m                Toggle dark mode
    ?                Help for the current tab
    q                Quit

TABS:
    [1] Calendar     Month view with events
    [2] To-do        Task list
    [3] Calculator   Basic arithmetic
    [4] Notes        Sticky notes
    [5] Pomodoro     Countdown timer
    [6] Audio        Audio player

CONFIG:
    ~/.config/deskmate/config.toml

LOGS:
    deskmate.log in the data directory (RUST_LOG controls the level)
"#
    );
}

/// Log to a file; a TUI cannot write to stdout
fn init_logging() -> Result<()> {
    let dir = config::Config::data_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {:?}", dir))?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("deskmate.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn run_app(reset_timer: bool) -> Result<()> {
    let config = config::Config::load().context("Failed to load configuration")?;

    // Without usable storage the app still runs, it just forgets on exit
    let storage_path = config.storage_path()?;
    let mut store: Box<dyn PreferenceStore> = match FileStore::open(&storage_path) {
        Ok(store) => {
            info!("Using storage at {:?}", store.path());
            Box::new(store)
        }
        Err(e) => {
            warn!("Storage unavailable, nothing will be saved: {:#}", e);
            Box::new(MemoryStore::new())
        }
    };

    if reset_timer {
        discard_saved_timer(store.as_mut());
    }

    let now = Instant::now();
    let mut app = App::new(
        config,
        store,
        tools::default_backend(),
        chrono::Local::now().date_naive(),
        now,
    );

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run main loop
    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Exiting with timer at {:?}", app.timer.state());
    result
}

/// Drop the persisted pomodoro; a failed write only costs the reset
fn discard_saved_timer(store: &mut dyn PreferenceStore) -> bool {
    match timer::PomodoroTimer::clear(store) {
        Ok(()) => {
            info!("Saved timer state discarded");
            true
        }
        Err(e) => {
            warn!("Failed to reset timer state: {:#}", e);
            false
        }
    }
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Deliver due timer ticks before drawing
        app.update(Instant::now());

        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Wake up in time for the next tick
        let now = Instant::now();
        let timeout = app
            .next_tick_in(now)
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now())?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
