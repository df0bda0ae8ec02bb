//! Recurring timers with explicit ownership.
//!
//! [`spawn_recurring`] returns a [`TimerHandle`]; the loop runs until the
//! handle is cancelled or dropped. Each tick's work is spawned as its own
//! task, so cancelling the timer leaves in-flight work alone.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owner of one recurring timer. Cancels the timer on drop.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
    period: Duration,
}

impl TimerHandle {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the timer loop is still scheduled.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the timer. Work already spawned by earlier ticks keeps running.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `tick` every `period`, first firing one period from now.
///
/// Must be called from within a tokio runtime. A zero period is clamped to
/// one millisecond.
pub fn spawn_recurring<F, Fut>(period: Duration, mut tick: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tokio::spawn(tick());
        }
    });
    TimerHandle { task, period }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_timer(period_ms: u64) -> (TimerHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handle = spawn_recurring(Duration::from_millis(period_ms), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        (handle, count)
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let (handle, count) = counting_timer(500);
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(handle.is_active());
        assert_eq!(handle.period(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_cadence() {
        let (_handle, count) = counting_timer(500);
        tokio::time::sleep(Duration::from_millis(2250)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let (handle, count) = counting_timer(100);
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.cancel();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticks() {
        let (handle, count) = counting_timer(100);
        drop(handle);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_leaves_in_flight_work_running() {
        let done = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&done);
        let handle = spawn_recurring(Duration::from_millis(100), move || {
            let d = Arc::clone(&d);
            async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                d.fetch_add(1, Ordering::SeqCst);
            }
        });
        // First tick at 100ms spawns work that finishes at 350ms.
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
