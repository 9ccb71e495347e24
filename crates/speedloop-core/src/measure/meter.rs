//! Byte counter and tick schedule for one transfer.

use crate::sample::Sample;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub(super) struct Meter {
    start: Instant,
    bytes: u64,
    interval: Duration,
    next_tick: Instant,
}

impl Meter {
    pub(super) fn start(now: Instant, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            start: now,
            bytes: 0,
            interval,
            next_tick: now + interval,
        }
    }

    pub(super) fn record(&mut self, n: usize) {
        self.bytes = self.bytes.saturating_add(n as u64);
    }

    pub(super) fn bytes(&self) -> u64 {
        self.bytes
    }

    pub(super) fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    /// True when a tick is due at `now`. Advances the schedule past `now`, so
    /// ticks missed while a read or a handoff was blocking are dropped, not queued.
    pub(super) fn tick_due(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        while self.next_tick <= now {
            self.next_tick += self.interval;
        }
        true
    }

    pub(super) fn sample(&self, url: &str, now: Instant) -> Sample {
        Sample::measured(url, self.bytes, self.elapsed(now))
    }
}
