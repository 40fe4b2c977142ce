//! Periodic timers owned by a view.
//!
//! Every task spawned through [`ViewTimers`] shares one cancellation token,
//! so tearing a view down (explicitly or by dropping it) stops its countdown
//! and summary refreshes in one step.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::countdown::{Countdown, CountdownTimer};

#[derive(Debug, Default)]
pub struct ViewTimers {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ViewTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` immediately and then every `period` until it breaks or the
    /// timers are cancelled.
    pub fn every<F>(&mut self, label: &'static str, period: Duration, mut task: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("{} timer cancelled", label);
                        break;
                    }
                    _ = ticker.tick() => {
                        trace!("{} tick", label);
                        if task().is_break() {
                            debug!("{} timer finished", label);
                            break;
                        }
                    }
                }
            }
        });
        self.handles.push(handle);
    }

    /// Run `task` once after `delay` unless cancelled first.
    pub fn after<F>(&mut self, label: &'static str, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("{} deadline cancelled", label);
                }
                _ = sleep(delay) => {
                    debug!("{} deadline reached", label);
                    task();
                }
            }
        });
        self.handles.push(handle);
    }

    /// Publish a countdown every `period`; the task ends after the first
    /// `LIVE NOW` value.
    pub fn countdown<C>(
        &mut self,
        match_time_secs: i64,
        period: Duration,
        now_ms: C,
    ) -> watch::Receiver<Countdown>
    where
        C: Fn() -> i64 + Send + 'static,
    {
        let mut timer = CountdownTimer::new(match_time_secs);
        let (tx, rx) = watch::channel(timer.tick(now_ms()));
        if timer.is_live() {
            return rx;
        }
        self.every("countdown", period, move || {
            let value = timer.tick(now_ms());
            if tx.send(value).is_err() || value.is_live_now() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        rx
    }

    /// Tasks that have not yet finished
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        self.handles.clear();
    }
}

impl Drop for ViewTimers {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Instant, advance};

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_runs_until_cancelled() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut timers = ViewTimers::new();
        let counter = hits.clone();
        timers.every("summary", Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        timers.cancel();
        assert!(timers.is_cancelled());
        advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timers_stops_tasks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        {
            let mut timers = ViewTimers::new();
            timers.every("summary", Duration::from_secs(1), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            });
            settle().await;
        }
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn after_fires_once_unless_cancelled() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut timers = ViewTimers::new();
        let counter = hits.clone();
        timers.after("transition", Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let counter = hits.clone();
        timers.after("transition", Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timers.cancel();
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_reaches_live_now_and_stops() {
        let start = Instant::now();
        let now_ms = move || 97_000 + start.elapsed().as_millis() as i64;
        let mut timers = ViewTimers::new();
        let mut rx = timers.countdown(100, Duration::from_secs(1), now_ms);
        assert_eq!(rx.borrow().to_string(), "00:00:03");

        for expected in ["00:00:02", "00:00:01", "LIVE NOW"] {
            advance(Duration::from_secs(1)).await;
            settle().await;
            assert_eq!(rx.borrow_and_update().to_string(), expected);
        }
        settle().await;
        assert_eq!(timers.active(), 0);
    }

    #[tokio::test]
    async fn countdown_already_live_spawns_nothing() {
        let mut timers = ViewTimers::new();
        let rx = timers.countdown(100, Duration::from_secs(1), || 200_000);
        assert!(rx.borrow().is_live_now());
        assert_eq!(timers.active(), 0);
    }
}
