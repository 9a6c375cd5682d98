//! Tick scheduling: the game loop's continuation as data, plus a deadline timer.

use std::time::{Duration, Instant};

/// What the simulation wants after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Run the next tick after this delay.
    After(Duration),
    /// Nothing to schedule until an external trigger.
    Halt,
}

/// One-shot deadline for the next tick. Re-armed after every tick it fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTimer {
    deadline: Option<Instant>,
}

impl TickTimer {
    pub const fn idle() -> Self {
        Self { deadline: None }
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Arm or disarm according to a step's continuation.
    pub fn follow(&mut self, now: Instant, next: Continuation) {
        match next {
            Continuation::After(delay) => self.schedule_after(now, delay),
            Continuation::Halt => self.cancel(),
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left until the deadline; zero once it has passed, None when idle.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Disarm and return true if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
