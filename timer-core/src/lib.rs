//! Pure timing logic library with no platform dependencies.
//! Time is passed in by the caller as an offset from a host-chosen origin,
//! so everything here is testable on the host without a real clock.

use std::fmt;
use std::time::Duration;

mod presenter;

pub use presenter::{DisplaySink, LogSink, PeriodicPresenter, TickHandle, TickScheduler};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// A recorded lap: its 1-based index and the time that was on display.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Lap {
    pub index: u32,
    pub time: String,
}

impl fmt::Display for Lap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lap {}: {}", self.index, self.time)
    }
}

pub struct TimerEngine {
    state: TimerState,
    accumulated: Duration,
    anchor: Option<Duration>,
    laps: Vec<Lap>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            accumulated: Duration::ZERO,
            anchor: None,
            laps: Vec::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    /// Starts from Idle or resumes from Paused. Returns false if already running.
    pub fn start(&mut self, now: Duration) -> bool {
        match self.state {
            TimerState::Running => false,
            TimerState::Idle => {
                self.accumulated = Duration::ZERO;
                self.anchor = Some(now);
                self.state = TimerState::Running;
                true
            }
            TimerState::Paused => {
                self.anchor = Some(now);
                self.state = TimerState::Running;
                true
            }
        }
    }

    /// Folds the running segment into the accumulator. Returns false if not running.
    pub fn stop(&mut self, now: Duration) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        if let Some(anchor) = self.anchor.take() {
            self.accumulated += now.saturating_sub(anchor);
        }
        self.state = TimerState::Paused;
        true
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.anchor = None;
        self.laps.clear();
        self.state = TimerState::Idle;
    }

    /// Records `shown` as the next lap. Ignored unless running.
    pub fn lap(&mut self, shown: &str) -> Option<&Lap> {
        if self.state != TimerState::Running {
            return None;
        }
        let index = self.laps.len() as u32 + 1;
        self.laps.push(Lap {
            index,
            time: shown.to_string(),
        });
        self.laps.last()
    }

    pub fn current_elapsed(&self, now: Duration) -> Duration {
        match (self.state, self.anchor) {
            (TimerState::Running, Some(anchor)) => self.accumulated + now.saturating_sub(anchor),
            _ => self.accumulated,
        }
    }
}

/// Format a duration as "HH:MM:SS.mmm", truncating every field.
/// Hours keep growing past 99 instead of wrapping.
pub fn format_hms_millis(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    let ms = elapsed.subsec_millis();
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}
