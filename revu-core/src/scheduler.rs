//! "Run every N ms until cancelled."
//!
//! The event loop uses two schedules: the poll timer (tens of seconds) and the
//! UI tick (≈100 ms). Each schedule is a tokio task driving a
//! `tokio::time::interval`; the callback usually just pushes an event onto the
//! loop's channel, so nothing here touches session state.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// A repeating timer. Dropping it cancels it.
#[derive(Debug)]
pub struct Schedule {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Schedule {
    /// Calls `fire` every `period`, first after one full period, until `fire`
    /// returns `ControlFlow::Break` or the schedule is cancelled.
    ///
    /// Missed ticks are delayed rather than bursted, so a stalled runtime never
    /// replays a backlog of polls.
    ///
    /// Must be called from within a tokio runtime.
    pub fn every<F>(name: &'static str, period: Duration, mut fire: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if fire().is_break() {
                    debug!(schedule = name, "schedule stopped by callback");
                    break;
                }
            }
        });
        Self { name, handle }
    }

    /// Stops the schedule. No further callbacks run once this returns and the
    /// runtime next polls the task.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!(schedule = self.name, "schedule cancelled");
        }
        self.handle.abort();
    }

    /// `true` once the schedule was cancelled or its callback asked to stop.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> ControlFlow<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let (count, fire) = counter();
        let _schedule = Schedule::every("test", Duration::from_millis(100), fire);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_calls() {
        let (count, fire) = counter();
        let schedule = Schedule::every("test", Duration::from_millis(100), fire);
        tokio::time::sleep(Duration::from_millis(150)).await;
        schedule.cancel();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(schedule.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_the_schedule() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let schedule = Schedule::every("test", Duration::from_millis(10), move || {
            if c.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(schedule.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels() {
        let (count, fire) = counter();
        drop(Schedule::every("test", Duration::from_millis(10), fire));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
