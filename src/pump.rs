use std::time::{Duration, Instant};

use timer_core::{TickHandle, TickScheduler};

/// Tick scheduler for the single-threaded event loop.
///
/// Nothing fires on its own: the loop sleeps until `next_deadline` and then
/// collects whatever `take_due` hands back.
pub struct DeadlinePump {
    next_id: u64,
    pending: Vec<(TickHandle, Instant)>,
}

impl DeadlinePump {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule_at(&mut self, deadline: Instant) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending.push((handle, deadline));
        handle
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, deadline)| *deadline).min()
    }

    /// Removes and returns the ticks due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TickHandle> {
        let mut due: Vec<(TickHandle, Instant)> = Vec::new();
        self.pending.retain(|&(handle, deadline)| {
            if deadline <= now {
                due.push((handle, deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(_, deadline)| deadline);
        due.into_iter().map(|(handle, _)| handle).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl TickScheduler for DeadlinePump {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        self.schedule_at(Instant::now() + delay)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }
}
