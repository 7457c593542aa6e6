use std::time::Duration;

use crate::{format_hms_millis, Lap, TimerEngine};

/// Identifies one scheduled tick so it can be cancelled or recognised as stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TickHandle(pub u64);

/// Host-provided one-shot timer registration.
pub trait TickScheduler {
    fn schedule(&mut self, delay: Duration) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Where the formatted time goes, e.g. a label.
pub trait DisplaySink {
    fn show(&mut self, text: &str);
}

/// Where lap entries go, e.g. a scrolling text area.
pub trait LogSink {
    fn append(&mut self, entry: &str);
    fn clear(&mut self);
}

/// Drives a [`TimerEngine`] on a fixed tick and keeps the display in step.
///
/// At most one tick is outstanding. Its handle is kept here so that stop and
/// reset cancel it before returning, and a tick delivered with any other
/// handle is dropped.
pub struct PeriodicPresenter<S, D, L> {
    engine: TimerEngine,
    scheduler: S,
    display: D,
    log: L,
    interval: Duration,
    pending: Option<TickHandle>,
    last_rendered: String,
}

impl<S, D, L> PeriodicPresenter<S, D, L>
where
    S: TickScheduler,
    D: DisplaySink,
    L: LogSink,
{
    pub fn new(scheduler: S, mut display: D, log: L, interval: Duration) -> Self {
        let last_rendered = format_hms_millis(Duration::ZERO);
        display.show(&last_rendered);
        Self {
            engine: TimerEngine::new(),
            scheduler,
            display,
            log,
            interval,
            pending: None,
            last_rendered,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn last_rendered(&self) -> &str {
        &self.last_rendered
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn start(&mut self, now: Duration) -> bool {
        if !self.engine.start(now) {
            return false;
        }
        self.render(now);
        self.schedule_next();
        true
    }

    pub fn stop(&mut self, now: Duration) -> bool {
        if !self.engine.stop(now) {
            return false;
        }
        self.cancel_pending();
        // Show the frozen value so a resume or lap starts from what is on screen.
        self.render(now);
        true
    }

    /// The single start/stop button.
    pub fn toggle(&mut self, now: Duration) -> bool {
        if self.engine.is_running() {
            self.stop(now)
        } else {
            self.start(now)
        }
    }

    pub fn reset(&mut self) {
        self.cancel_pending();
        self.engine.reset();
        self.last_rendered = format_hms_millis(Duration::ZERO);
        self.display.show(&self.last_rendered);
        self.log.clear();
    }

    /// Records whatever is currently on display. Ignored unless running.
    pub fn lap(&mut self) -> Option<Lap> {
        let lap = self.engine.lap(&self.last_rendered)?.clone();
        self.log.append(&lap.to_string());
        Some(lap)
    }

    /// Handles a fired tick. Returns false for stale or cancelled ticks.
    pub fn on_tick(&mut self, handle: TickHandle, now: Duration) -> bool {
        if self.pending != Some(handle) || !self.engine.is_running() {
            return false;
        }
        self.pending = None;
        self.render(now);
        self.schedule_next();
        true
    }

    fn render(&mut self, now: Duration) {
        self.last_rendered = format_hms_millis(self.engine.current_elapsed(now));
        self.display.show(&self.last_rendered);
    }

    fn schedule_next(&mut self) {
        self.cancel_pending();
        self.pending = Some(self.scheduler.schedule(self.interval));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}
