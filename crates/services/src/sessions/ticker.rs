use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Default period between elapsed-time ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Repeating one-second timer bound to a single active attempt.
///
/// The timer runs as a tokio task and pushes ticks into a channel of capacity one,
/// so a slow consumer sees at most one pending tick; the session clock recovers
/// anything skipped from the wall clock. Dropping the ticker stops the task.
#[derive(Debug)]
pub struct Ticker {
    task: JoinHandle<()>,
    ticks: mpsc::Receiver<()>,
}

impl Ticker {
    /// Spawn a ticker on the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime.
    #[must_use]
    pub fn spawn(period: Duration) -> Option<Self> {
        let handle = Handle::try_current().ok()?;
        let (tx, ticks) = mpsc::channel(1);
        let task = handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        });
        Some(Self { task, ticks })
    }

    /// Wait for the next tick. Returns `false` once the ticker has stopped.
    pub async fn tick(&mut self) -> bool {
        self.ticks.recv().await.is_some()
    }

    /// Stop the timer task. Further calls to `tick` return `false`.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.ticks.close();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_outside_runtime_is_none() {
        assert!(Ticker::spawn(TICK_PERIOD).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut ticker = Ticker::spawn(TICK_PERIOD).unwrap();
        let started = Instant::now();

        assert!(ticker.tick().await);
        assert_eq!(started.elapsed(), TICK_PERIOD);
        assert!(ticker.tick().await);
        assert_eq!(started.elapsed(), TICK_PERIOD * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let mut ticker = Ticker::spawn(TICK_PERIOD).unwrap();
        assert!(ticker.tick().await);

        ticker.cancel();

        assert!(!ticker.tick().await);
    }
}
