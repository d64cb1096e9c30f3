//! Pomodoro countdown timer
//!
//! The timer is a small state machine (Idle, Running, Finished) over a
//! minutes/seconds pair. It knows nothing about wall-clock time: the shell
//! owns a [`Ticker`] while the timer runs and feeds it one `tick()` per
//! elapsed second.

use crate::config::DEFAULT_TIMER_MINUTES;
use crate::store::{
    read_bool, read_u32, PreferenceStore, KEY_TIMER_MINUTES, KEY_TIMER_RUNNING, KEY_TIMER_SECONDS,
};
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::debug;

/// Remaining time and running flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub minutes: u32,
    pub seconds: u32,
    pub running: bool,
}

impl TimerState {
    /// A stopped timer showing `minutes:00`
    pub fn full(minutes: u32) -> Self {
        Self {
            minutes,
            seconds: 0,
            running: false,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }
}

/// Lifecycle phase derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Finished,
}

impl TimerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "Paused",
            TimerStatus::Running => "Running",
            TimerStatus::Finished => "Finished",
        }
    }
}

/// Countdown engine
#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    state: TimerState,
    duration_minutes: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_MINUTES)
    }
}

impl PomodoroTimer {
    /// Fresh timer at the configured duration
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            state: TimerState::full(duration_minutes),
            duration_minutes,
        }
    }

    /// Timer resuming `state`. Inconsistent states fall back to a fresh timer.
    pub fn with_state(duration_minutes: u32, state: TimerState) -> Self {
        let mut timer = Self::new(duration_minutes);
        if timer.accepts(&state) {
            timer.state = state;
        } else {
            debug!("Discarding inconsistent timer state {:?}", state);
        }
        timer
    }

    /// Restore from the preference store. Any missing, malformed or
    /// inconsistent field discards the whole persisted state.
    pub fn load(store: &dyn PreferenceStore, duration_minutes: u32) -> Self {
        let minutes = read_u32(store, KEY_TIMER_MINUTES);
        let seconds = read_u32(store, KEY_TIMER_SECONDS);
        let running = read_bool(store, KEY_TIMER_RUNNING);

        match (minutes, seconds, running) {
            (Some(minutes), Some(seconds), Some(running)) => Self::with_state(
                duration_minutes,
                TimerState {
                    minutes,
                    seconds,
                    running,
                },
            ),
            _ => {
                debug!("No complete timer state stored, starting at {}:00", duration_minutes);
                Self::new(duration_minutes)
            }
        }
    }

    /// Write all three fields to the store
    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        store.write_string(KEY_TIMER_MINUTES, &self.state.minutes.to_string())?;
        store.write_string(KEY_TIMER_SECONDS, &self.state.seconds.to_string())?;
        store.write_string(KEY_TIMER_RUNNING, &self.state.running.to_string())?;
        Ok(())
    }

    /// Forget any persisted timer state
    pub fn clear(store: &mut dyn PreferenceStore) -> Result<()> {
        store.remove(KEY_TIMER_MINUTES)?;
        store.remove(KEY_TIMER_SECONDS)?;
        store.remove(KEY_TIMER_RUNNING)?;
        Ok(())
    }

    fn accepts(&self, state: &TimerState) -> bool {
        state.seconds <= 59
            && state.minutes <= self.duration_minutes
            && state.total_seconds() <= self.duration_minutes * 60
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn status(&self) -> TimerStatus {
        if self.state.running {
            TimerStatus::Running
        } else if self.state.is_zero() {
            TimerStatus::Finished
        } else {
            TimerStatus::Idle
        }
    }

    /// Fraction of the configured duration already elapsed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        let total = f64::from(self.duration_minutes * 60);
        if total == 0.0 {
            return 1.0;
        }
        (1.0 - f64::from(self.state.total_seconds()) / total).clamp(0.0, 1.0)
    }

    /// Begin counting down. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        if self.state.running || self.state.is_zero() {
            return false;
        }
        self.state.running = true;
        true
    }

    /// Stop counting, keeping the remaining time
    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        true
    }

    /// Stop and restore the configured duration
    pub fn reset(&mut self) -> bool {
        let fresh = TimerState::full(self.duration_minutes);
        let changed = self.state != fresh;
        self.state = fresh;
        changed
    }

    /// Advance by one second. At 0:00 the tick stops the timer instead.
    pub fn tick(&mut self) -> bool {
        if !self.state.running {
            return false;
        }

        if self.state.seconds > 0 {
            self.state.seconds -= 1;
        } else if self.state.minutes > 0 {
            self.state.minutes -= 1;
            self.state.seconds = 59;
        } else {
            self.state.running = false;
        }
        true
    }
}

/// Handle for the recurring one-second callback
///
/// Holding a `Ticker` means ticks are scheduled; dropping it cancels them.
#[derive(Debug, Clone)]
pub struct Ticker {
    next_due: Instant,
    period: Duration,
}

impl Ticker {
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// Schedule the first tick one period after `now`
    pub fn start(now: Instant) -> Self {
        Self {
            next_due: now + Self::PERIOD,
            period: Self::PERIOD,
        }
    }

    /// Number of ticks that fell due up to `now`. Missed periods are all
    /// delivered; the deadline advances past each one.
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut count = 0;
        while now >= self.next_due {
            self.next_due += self.period;
            count += 1;
        }
        count
    }

    /// Time left until the next tick
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    fn running(minutes: u32, seconds: u32) -> PomodoroTimer {
        PomodoroTimer::with_state(
            25,
            TimerState {
                minutes,
                seconds,
                running: true,
            },
        )
    }

    #[test]
    fn test_default_timer() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.state(), TimerState::full(25));
        assert_eq!(timer.status(), TimerStatus::Idle);
    }

    #[test]
    fn test_last_second_then_terminal() {
        let mut timer = running(0, 1);
        timer.tick();
        assert_eq!(
            timer.state(),
            TimerState { minutes: 0, seconds: 0, running: true }
        );
        timer.tick();
        assert_eq!(
            timer.state(),
            TimerState { minutes: 0, seconds: 0, running: false }
        );
        assert_eq!(timer.status(), TimerStatus::Finished);

        // Nothing moves once finished
        assert!(!timer.tick());
        assert_eq!(timer.state().total_seconds(), 0);
    }

    #[test]
    fn test_minute_rollover() {
        let mut timer = running(1, 0);
        timer.tick();
        assert_eq!(
            timer.state(),
            TimerState { minutes: 0, seconds: 59, running: true }
        );
    }

    #[test]
    fn test_start_at_zero_is_noop() {
        let mut timer = PomodoroTimer::with_state(25, TimerState::full(0));
        assert!(!timer.start());
        assert_eq!(timer.state(), TimerState::full(0));
    }

    #[test]
    fn test_start_pause_preserves_time() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.start());
        assert!(!timer.start());
        timer.tick();
        timer.tick();
        assert!(timer.pause());
        assert!(!timer.pause());
        assert_eq!(
            timer.state(),
            TimerState { minutes: 24, seconds: 58, running: false }
        );
        assert!(!timer.tick());
    }

    #[test]
    fn test_reset_restores_configured_duration() {
        let mut timer = PomodoroTimer::new(50);
        timer.start();
        timer.tick();
        assert!(timer.reset());
        assert_eq!(timer.state(), TimerState::full(50));
        assert!(!timer.reset());
    }

    #[test]
    fn test_inconsistent_state_is_discarded() {
        let bad_seconds = TimerState { minutes: 3, seconds: 75, running: false };
        assert_eq!(PomodoroTimer::with_state(25, bad_seconds).state(), TimerState::full(25));

        let too_long = TimerState { minutes: 25, seconds: 1, running: true };
        assert_eq!(PomodoroTimer::with_state(25, too_long).state(), TimerState::full(25));
    }

    #[test]
    fn test_store_roundtrip() {
        let mut store = MemoryStore::new();
        let mut timer = PomodoroTimer::default();
        timer.start();
        for _ in 0..75 {
            timer.tick();
        }
        timer.save(&mut store).unwrap();

        let restored = PomodoroTimer::load(&store, 25);
        assert_eq!(restored.state(), timer.state());
        assert_eq!(store.read_string(KEY_TIMER_RUNNING).as_deref(), Some("true"));
        assert_eq!(store.read_string(KEY_TIMER_MINUTES).as_deref(), Some("23"));
        assert_eq!(store.read_string(KEY_TIMER_SECONDS).as_deref(), Some("45"));
    }

    #[test]
    fn test_load_falls_back_on_missing_or_malformed_fields() {
        let mut store = MemoryStore::new();
        assert_eq!(PomodoroTimer::load(&store, 25).state(), TimerState::full(25));

        store.write_string(KEY_TIMER_MINUTES, "10").unwrap();
        store.write_string(KEY_TIMER_SECONDS, "5").unwrap();
        assert_eq!(PomodoroTimer::load(&store, 25).state(), TimerState::full(25));

        store.write_string(KEY_TIMER_RUNNING, "maybe").unwrap();
        assert_eq!(PomodoroTimer::load(&store, 25).state(), TimerState::full(25));

        store.write_string(KEY_TIMER_RUNNING, "false").unwrap();
        assert_eq!(
            PomodoroTimer::load(&store, 25).state(),
            TimerState { minutes: 10, seconds: 5, running: false }
        );
    }

    #[test]
    fn test_load_falls_back_on_huge_minutes() {
        let mut store = MemoryStore::new();
        store.write_string(KEY_TIMER_SECONDS, "0").unwrap();
        store.write_string(KEY_TIMER_RUNNING, "true").unwrap();

        for minutes in ["4294967295", "71582789"] {
            store.write_string(KEY_TIMER_MINUTES, minutes).unwrap();
            let timer = PomodoroTimer::load(&store, 25);
            assert_eq!(timer.state(), TimerState::full(25));
            assert!(!timer.is_running());
        }
    }

    #[test]
    fn test_total_seconds_saturates() {
        let state = TimerState { minutes: u32::MAX, seconds: 59, running: false };
        assert_eq!(state.total_seconds(), u32::MAX);
    }

    #[test]
    fn test_clear_forgets_state() {
        let mut store = MemoryStore::new();
        let mut timer = PomodoroTimer::default();
        timer.start();
        timer.tick();
        timer.save(&mut store).unwrap();

        PomodoroTimer::clear(&mut store).unwrap();
        assert_eq!(PomodoroTimer::load(&store, 25).state(), TimerState::full(25));
    }

    #[test]
    fn test_progress() {
        let mut timer = PomodoroTimer::new(1);
        assert_eq!(timer.progress(), 0.0);
        timer.start();
        for _ in 0..30 {
            timer.tick();
        }
        assert!((timer.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ticker_counts_whole_periods() {
        let t0 = Instant::now();
        let mut ticker = Ticker::start(t0);

        assert_eq!(ticker.due(t0), 0);
        assert_eq!(ticker.due(t0 + Duration::from_millis(999)), 0);
        assert_eq!(ticker.due(t0 + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.due(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(ticker.due(t0 + Duration::from_millis(4200)), 3);
        assert_eq!(ticker.until_next(t0 + Duration::from_millis(4200)), Duration::from_millis(800));
    }

    proptest! {
        #[test]
        fn prop_countdown_is_monotonic_and_reaches_zero(
            minutes in 0u32..=25,
            seconds in 0u32..60,
            ticks in 0usize..2000,
        ) {
            prop_assume!(minutes * 60 + seconds <= 25 * 60);
            let mut timer = running(minutes, seconds);
            let mut previous = timer.state().total_seconds();

            for _ in 0..ticks {
                let was_running = timer.is_running();
                let before = timer.state();
                timer.tick();
                let now = timer.state();

                prop_assert!(now.total_seconds() <= previous);
                prop_assert!(now.seconds <= 59);
                if was_running && !now.running {
                    // Only the tick that finds 0:00 may stop the timer
                    prop_assert_eq!(before.total_seconds(), 0);
                }
                if was_running && before.total_seconds() > 0 {
                    prop_assert_eq!(now.total_seconds(), before.total_seconds() - 1);
                }
                previous = now.total_seconds();
            }

            if ticks as u32 > minutes * 60 + seconds {
                prop_assert_eq!(timer.status(), TimerStatus::Finished);
            }
        }

        #[test]
        fn prop_reset_always_yields_full_duration(
            minutes in 0u32..=25,
            seconds in 0u32..60,
            running_flag in any::<bool>(),
        ) {
            let mut timer = PomodoroTimer::with_state(
                25,
                TimerState { minutes, seconds, running: running_flag },
            );
            timer.reset();
            prop_assert_eq!(timer.state(), TimerState { minutes: 25, seconds: 0, running: false });
        }
    }
}
