use chrono::{DateTime, Utc};

use crate::time::whole_seconds_between;

/// Elapsed-time bookkeeping for one attempt.
///
/// `elapsed_seconds` is bumped once per timer tick while running, but the wall clock is
/// authoritative: every reconcile snaps the counter to `now - started_at` (never below an
/// earlier reading), and stopping freezes it to exactly `ended_at - started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    elapsed_seconds: u64,
    wall_seconds: u64,
}

impl SessionClock {
    #[must_use]
    pub fn start(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            ended_at: None,
            elapsed_seconds: 0,
            wall_seconds: 0,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Count one second. Returns false (and does nothing) once stopped.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        true
    }

    /// Replace the tick count with the wall-clock delta. No-op once stopped.
    ///
    /// Missed ticks are recovered and ticks that ran ahead of the wall clock are dropped.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> u64 {
        if self.is_running() {
            self.wall_seconds = self
                .wall_seconds
                .max(whole_seconds_between(self.started_at, now));
            self.elapsed_seconds = self.wall_seconds;
        }
        self.elapsed_seconds
    }

    /// Stop the clock at `at` and return the frozen elapsed value.
    ///
    /// Idempotent: later calls keep the first `ended_at` and elapsed value.
    pub fn stop(&mut self, at: DateTime<Utc>) -> u64 {
        if self.is_running() {
            let at = at.max(self.started_at);
            self.elapsed_seconds = whole_seconds_between(self.started_at, at);
            self.wall_seconds = self.elapsed_seconds;
            self.ended_at = Some(at);
        }
        self.elapsed_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn ticks_while_running() {
        let mut clock = SessionClock::start(fixed_now());
        assert!(clock.tick());
        assert!(clock.tick());
        assert_eq!(clock.elapsed_seconds(), 2);
        assert!(clock.is_running());
    }

    #[test]
    fn reconcile_recovers_missed_ticks() {
        let mut clock = SessionClock::start(fixed_now());
        clock.tick();
        let elapsed = clock.reconcile(fixed_now() + Duration::seconds(10));
        assert_eq!(elapsed, 10);
    }

    #[test]
    fn reconcile_caps_ticks_at_wall_clock() {
        let mut clock = SessionClock::start(fixed_now());
        for _ in 0..5 {
            clock.tick();
        }
        assert_eq!(clock.reconcile(fixed_now() + Duration::seconds(2)), 2);
    }

    #[test]
    fn reconcile_never_goes_backwards() {
        let mut clock = SessionClock::start(fixed_now());
        assert_eq!(clock.reconcile(fixed_now() + Duration::seconds(8)), 8);
        assert_eq!(clock.reconcile(fixed_now() + Duration::seconds(3)), 8);
    }

    #[test]
    fn frozen_value_matches_start_and_end() {
        let mut clock = SessionClock::start(fixed_now());
        for _ in 0..5 {
            clock.tick();
        }
        let end = fixed_now() + Duration::seconds(2);

        assert_eq!(clock.stop(end), 2);
        let ended_at = clock.ended_at().unwrap();
        assert_eq!(
            whole_seconds_between(clock.started_at(), ended_at),
            clock.elapsed_seconds()
        );
    }

    #[test]
    fn stop_uses_wall_clock_delta() {
        let mut clock = SessionClock::start(fixed_now());
        clock.tick();
        let end = fixed_now() + Duration::seconds(42);
        assert_eq!(clock.stop(end), 42);
        assert_eq!(clock.ended_at(), Some(end));
        assert!(!clock.is_running());
    }

    #[test]
    fn stop_is_idempotent_and_freezes() {
        let mut clock = SessionClock::start(fixed_now());
        let end = fixed_now() + Duration::seconds(7);
        clock.stop(end);

        assert_eq!(clock.stop(end + Duration::seconds(100)), 7);
        assert!(!clock.tick());
        assert_eq!(clock.reconcile(end + Duration::seconds(100)), 7);
        assert_eq!(clock.ended_at(), Some(end));
    }

    #[test]
    fn stop_before_start_is_clamped() {
        let mut clock = SessionClock::start(fixed_now());
        clock.stop(fixed_now() - Duration::seconds(3));
        assert_eq!(clock.ended_at(), Some(fixed_now()));
        assert_eq!(clock.elapsed_seconds(), 0);
    }
}
