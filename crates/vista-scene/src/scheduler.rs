//! Virtual-clock timer queue (`setTimeout` / `setInterval`).
//!
//! Timers fire in due-time order; timers due at the same instant fire in
//! creation order. Interval timers keep their id across repetitions and run
//! until cancelled.

use serde::{Deserialize, Serialize};

/// Handle returned when a timer is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Who receives a timer when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOwner {
    /// A page behavior, by registration index.
    Behavior(usize),
    /// The shared notification surface.
    Notifier,
    /// The page's smooth-scroll animation.
    ScrollAnimation,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    owner: TimerOwner,
    due_ms: u64,
    interval_ms: Option<u64>,
    seq: u64,
}

/// A timer that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub owner: TimerOwner,
    pub at_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn set_timeout(&mut self, owner: TimerOwner, delay_ms: u64) -> TimerId {
        self.schedule(owner, delay_ms, None)
    }

    /// Repeat every `period_ms` (at least 1ms) until cancelled.
    pub fn set_interval(&mut self, owner: TimerOwner, period_ms: u64) -> TimerId {
        let period = period_ms.max(1);
        self.schedule(owner, period, Some(period))
    }

    fn schedule(&mut self, owner: TimerOwner, delay_ms: u64, interval_ms: Option<u64>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let seq = self.bump_seq();
        self.timers.push(Timer {
            id,
            owner,
            due_ms: self.now_ms + delay_ms,
            interval_ms,
            seq,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Cancel a pending timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.due_ms).min()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Interval timers are re-armed for their next period.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTimer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
            .map(|(index, _)| index)?;

        let due = self.timers[index].due_ms;
        self.now_ms = self.now_ms.max(due);
        let fired = FiredTimer {
            id: self.timers[index].id,
            owner: self.timers[index].owner,
            at_ms: self.now_ms,
        };
        match self.timers[index].interval_ms {
            Some(period) => {
                let seq = self.bump_seq();
                let timer = &mut self.timers[index];
                timer.due_ms = due + period;
                timer.seq = seq;
            }
            None => {
                self.timers.remove(index);
            }
        }
        Some(fired)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.now_ms = self.now_ms.max(at_ms);
    }
}
