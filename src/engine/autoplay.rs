use std::time::{Duration, Instant};

/// The engine's single repeating timer, held as the deadline of its next tick.
///
/// Ticks are spaced from the previous *scheduled* tick, not from the last
/// successful navigation, so ticks refused by the transition lock never make
/// the cadence drift. A host that polls late gets one tick, never a backlog.
#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl AutoplayScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// No-op when already running.
    pub fn start(&mut self, now: Instant) {
        if self.next_tick.is_none() {
            self.next_tick = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// A changed interval restarts a running timer from `now`.
    pub fn reconfigure(&mut self, interval: Duration, now: Instant) {
        if interval == self.interval {
            return;
        }
        self.interval = interval;
        if self.is_running() {
            self.next_tick = Some(now + interval);
        }
    }

    /// Consume the tick scheduled at or before `now`, returning when it was due.
    ///
    /// Ticks missed between `due` and `now` are skipped; the next one lands on
    /// the first point of the original grid strictly after `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<Instant> {
        let due = self.next_tick.filter(|at| *at <= now)?;
        let period = self.interval.as_nanos().max(1);
        let periods = (now - due).as_nanos() / period + 1;
        let offset = u64::try_from(periods * period).unwrap_or(u64::MAX);
        self.next_tick = due.checked_add(Duration::from_nanos(offset));
        Some(due)
    }
}
