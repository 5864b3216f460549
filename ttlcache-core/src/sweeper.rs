//! Periodic background sweep.
//!
//! The task only holds a `Weak` reference to what it sweeps, so it never keeps
//! the cache alive. It stops when told to, when its [`Sweeper`] is dropped, or
//! when the target has gone away.

use parking_lot::Mutex;
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::CacheError;

/// One sweep pass over the target, returning how many entries it removed.
pub(crate) type SweepPass<T> = fn(&T) -> usize;

/// Owner of a running sweep task
pub(crate) struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Starts a task that runs `pass` every `interval`, first one interval from now
    pub(crate) fn spawn<T>(
        target: Weak<T>,
        interval: Duration,
        pass: SweepPass<T>,
    ) -> Result<Self, CacheError>
    where
        T: Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidCleanupInterval);
        }
        let first_tick = Instant::now()
            .checked_add(interval)
            .ok_or(CacheError::InvalidCleanupInterval)?;
        let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(run(target, first_tick, interval, pass, shutdown_rx));

        Ok(Self {
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Signals the task to stop and cancels it; idempotent
    pub(crate) fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<T>(
    target: Weak<T>,
    first_tick: Instant,
    interval: Duration,
    pass: SweepPass<T>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::trace!(interval_ms = interval.as_millis() as u64, "sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else {
                    break;
                };
                let removed = pass(&target);
                if removed > 0 {
                    tracing::debug!(removed, "sweep removed expired entries");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    tracing::trace!("sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn count_pass(counter: &AtomicUsize) -> usize {
        counter.fetch_add(1, Ordering::SeqCst);
        0
    }

    #[test]
    fn test_requires_runtime() {
        let target = Arc::new(AtomicUsize::new(0));
        let result = Sweeper::spawn(Arc::downgrade(&target), Duration::from_secs(1), count_pass);
        assert!(matches!(result, Err(CacheError::RuntimeUnavailable)));
    }

    #[tokio::test]
    async fn test_rejects_zero_interval() {
        let target = Arc::new(AtomicUsize::new(0));
        let result = Sweeper::spawn(Arc::downgrade(&target), Duration::ZERO, count_pass);
        assert!(matches!(result, Err(CacheError::InvalidCleanupInterval)));
    }

    #[tokio::test]
    async fn test_rejects_unrepresentable_interval() {
        let target = Arc::new(AtomicUsize::new(0));
        let result = Sweeper::spawn(Arc::downgrade(&target), Duration::MAX, count_pass);
        assert!(matches!(result, Err(CacheError::InvalidCleanupInterval)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_pass_waits_one_interval() {
        let target = Arc::new(AtomicUsize::new(0));
        let _sweeper =
            Sweeper::spawn(Arc::downgrade(&target), Duration::from_millis(100), count_pass).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(target.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(target.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_passes() {
        let target = Arc::new(AtomicUsize::new(0));
        let sweeper =
            Sweeper::spawn(Arc::downgrade(&target), Duration::from_millis(100), count_pass).unwrap();
        assert!(sweeper.is_running());

        tokio::time::sleep(Duration::from_millis(250)).await;
        sweeper.stop();
        assert!(!sweeper.is_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.load(Ordering::SeqCst), 2);

        // A second stop is a no-op
        sweeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_target_dropped() {
        let target = Arc::new(AtomicUsize::new(0));
        let sweeper =
            Sweeper::spawn(Arc::downgrade(&target), Duration::from_millis(100), count_pass).unwrap();

        drop(target);
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(!sweeper.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let target = Arc::new(AtomicUsize::new(0));
        let sweeper =
            Sweeper::spawn(Arc::downgrade(&target), Duration::from_millis(100), count_pass).unwrap();

        drop(sweeper);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(target.load(Ordering::SeqCst), 0);
        // Only the test's own handle remains
        assert_eq!(Arc::strong_count(&target), 1);
    }
}
