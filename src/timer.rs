// Interval timers - Repeating deadlines for the event loop
//
// The event loop asks each timer whether it is due, runs the callback if
// so, and sleeps until the earliest next deadline.

use std::time::{Duration, Instant};

/// Repeating timer with a fixed interval
///
/// Missed periods are coalesced: after a stall the timer fires once and
/// the next deadline is one interval after that, never a burst.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    /// Create a timer whose first tick is one interval after `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Returns true and reschedules if the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }

        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }

    /// Instant of the next tick
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Earliest deadline among a set of timers
pub fn earliest_deadline<'a>(timers: impl IntoIterator<Item = &'a IntervalTimer>) -> Option<Instant> {
    timers.into_iter().map(IntervalTimer::next_due).min()
}
