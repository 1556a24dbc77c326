//! Deferred work: the "run this later" capability.
//!
//! The deferred re-check must not run on the handshake path, and tests
//! must be able to fire it without waiting in real time. Both needs are
//! met by injecting a [`Scheduler`] instead of reaching for a global one.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;

/// A unit of deferred work.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs a task after a delay.
///
/// Implementations must not run `task` inline: the caller may still be
/// inside a connection handshake.
pub trait Scheduler: Send + Sync + 'static {
    /// Schedules `task` to start once `delay` has elapsed.
    fn run_after(&self, delay: Duration, task: Task);
}

/// [`Scheduler`] backed by the current Tokio runtime.
///
/// Each task becomes its own spawned Tokio task that sleeps, then runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn run_after(&self, delay: Duration, task: Task) {
        // Calling outside a runtime would panic in `tokio::spawn`; drop the
        // task with an error instead.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                delay_ms = delay.as_millis() as u64,
                "no Tokio runtime: deferred task dropped"
            );
            return;
        };
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}

/// Adds a random jitter in `0..=max_jitter` to `base`.
///
/// Used to desynchronize deferred work that was scheduled in a burst.
pub fn jittered(base: Duration, max_jitter: Duration) -> Duration {
    let max_us = max_jitter.as_micros() as u64;
    if max_us == 0 {
        return base;
    }
    let us = rand::rng().random_range(0..=max_us);
    base + Duration::from_micros(us)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn test_jittered_stays_within_bounds() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(50);
        for _ in 0..200 {
            let d = jittered(base, max);
            assert!(d >= base && d <= base + max, "{d:?} out of range");
        }
    }

    #[test]
    fn test_jittered_zero_jitter_is_exact() {
        let base = Duration::from_millis(250);
        assert_eq!(jittered(base, Duration::ZERO), base);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_runs_task_after_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        TokioScheduler.run_after(
            Duration::from_secs(3),
            Box::pin(async move { flag.store(true, Ordering::SeqCst) }),
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!ran.load(Ordering::SeqCst), "must not run early");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tokio_scheduler_outside_runtime_drops_task() {
        // Must not panic.
        TokioScheduler.run_after(Duration::ZERO, Box::pin(async {}));
    }
}
