//! Cooperative, polled time control for a single move.
//!
//! Nothing interrupts the search. The core asks the governor after every
//! child search whether the budget is spent; once it answers yes the answer
//! latches and every frame unwinds without expanding further. Overrun is
//! bounded by the work between two polls: one child subtree plus whatever
//! quiescence was already in flight.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of elapsed time for the current turn.
pub trait Clock {
    fn elapsed_this_turn(&self) -> Duration;
}

/// Wall clock started when the turn begins.
#[derive(Debug, Clone, Copy)]
pub struct TurnClock {
    started_at: Instant,
}

impl TurnClock {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Clock for TurnClock {
    #[inline]
    fn elapsed_this_turn(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Deterministic clock that advances by a fixed step each time it is read.
#[derive(Debug, Clone)]
pub struct StepClock {
    step: Duration,
    now: Cell<Duration>,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            now: Cell::new(Duration::ZERO),
        }
    }

    pub fn reads(&self) -> u128 {
        if self.step.is_zero() {
            0
        } else {
            self.now.get().as_nanos() / self.step.as_nanos()
        }
    }
}

impl Clock for StepClock {
    fn elapsed_this_turn(&self) -> Duration {
        let next = self.now.get() + self.step;
        self.now.set(next);
        next
    }
}

#[derive(Debug, Clone)]
pub struct TimeGovernor<C> {
    clock: C,
    budget: Duration,
    stopped: bool,
    polls: u64,
}

impl<C: Clock> TimeGovernor<C> {
    pub fn new(clock: C, budget: Duration) -> Self {
        Self {
            clock,
            budget,
            stopped: false,
            polls: 0,
        }
    }

    /// Read the clock and latch the stop flag once the budget is spent.
    pub fn poll_expired(&mut self) -> bool {
        if !self.stopped {
            self.polls += 1;
            self.stopped = self.clock.elapsed_this_turn() >= self.budget;
        }
        self.stopped
    }

    /// Latched state, without reading the clock.
    #[inline]
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed_this_turn()
    }

    #[inline]
    pub fn polls(&self) -> u64 {
        self.polls
    }
}
