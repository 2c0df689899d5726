//! Timestamp sources for LWW writes.
//!
//! Stamps are microseconds since the Unix epoch. A replica never issues the
//! same stamp twice: every clock hands out strictly increasing values, even
//! when the wall clock stalls or steps backwards.

use chrono::Utc;

/// A source of strictly increasing write timestamps.
pub trait Clock {
    /// Returns the next timestamp in microseconds since the Unix epoch.
    fn now_us(&mut self) -> u64;
}

/// Wall-clock time, bumped forward when it would repeat or regress.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    last: u64,
}

impl SystemClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }
}

impl Clock for SystemClock {
    fn now_us(&mut self) -> u64 {
        let wall = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        let next = wall.max(self.last.saturating_add(1));
        if next != wall {
            tracing::trace!(wall, next, "wall clock did not advance; bumping stamp");
        }
        self.last = next;
        next
    }
}

/// A hand-driven clock for tests and simulations.
///
/// Each read returns the current value and then advances it by one
/// microsecond; [`ManualClock::set`] jumps to an arbitrary instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    #[must_use]
    pub const fn starting_at(now: u64) -> Self {
        Self { now }
    }

    pub const fn set(&mut self, now: u64) {
        self.now = now;
    }

    /// The value the next read will return.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.now
    }
}

impl Clock for ManualClock {
    fn now_us(&mut self) -> u64 {
        let now = self.now;
        self.now = self.now.saturating_add(1);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_strictly_increasing() {
        let mut clock = SystemClock::new();
        let mut previous = clock.now_us();
        for _ in 0..1000 {
            let next = clock.now_us();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn system_clock_is_near_wall_time() {
        let mut clock = SystemClock::new();
        let wall = u64::try_from(Utc::now().timestamp_micros()).unwrap();
        let stamp = clock.now_us();
        assert!(stamp >= wall);
        assert!(stamp - wall < 60_000_000);
    }

    #[test]
    fn manual_clock_ticks_and_jumps() {
        let mut clock = ManualClock::starting_at(100);
        assert_eq!(clock.now_us(), 100);
        assert_eq!(clock.now_us(), 101);
        clock.set(50);
        assert_eq!(clock.peek(), 50);
        assert_eq!(clock.now_us(), 50);
    }
}
