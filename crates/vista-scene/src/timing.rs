//! Rate limiting on the virtual clock.

use crate::scheduler::{Scheduler, TimerId, TimerOwner};

/// Leading-edge throttle: the first call passes, further calls are dropped
/// until `limit_ms` has elapsed since the last call that passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: u64,
    open_at: Option<u64>,
}

impl Throttle {
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            open_at: None,
        }
    }

    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        match self.open_at {
            Some(open_at) if now_ms < open_at => false,
            _ => {
                self.open_at = Some(now_ms + self.limit_ms);
                true
            }
        }
    }
}

/// Trailing-edge debounce: every call re-arms a single timer, so the owner
/// only sees one firing `wait_ms` after the last call.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait_ms: u64,
    pending: Option<TimerId>,
}

impl Debounce {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            pending: None,
        }
    }

    pub fn call(&mut self, scheduler: &mut Scheduler, owner: TimerOwner) -> TimerId {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        let id = scheduler.set_timeout(owner, self.wait_ms);
        self.pending = Some(id);
        id
    }

    /// Whether `timer` is this debounce's live timer; clears it if so.
    pub fn take_fired(&mut self, timer: TimerId) -> bool {
        if self.pending == Some(timer) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
