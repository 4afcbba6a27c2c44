//! Adaptive scheduler for the recurring scrape job
//!
//! The scheduler owns the single pending timer for the scrape job. Every
//! cycle, whether it succeeds, fails or panics, ends by re-arming the timer,
//! and re-arming always cancels the previously pending timer first. Cycles
//! never overlap: the timer path and forced refreshes share one in-flight
//! lock, so a forced refresh issued during a running cycle waits for it and
//! then runs its own.

use crate::schedule::policy::{max_delay, SchedulePolicy};
use crate::scrape::{CycleReport, DEFAULT_DELAY_SECS};
use crate::StockError;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// One execution of the scrape pipeline
#[async_trait]
pub trait CycleRunner: Send + Sync + 'static {
    async fn run_cycle(&self) -> Result<CycleReport, StockError>;
}

#[async_trait]
impl<T: CycleRunner + ?Sized> CycleRunner for Arc<T> {
    async fn run_cycle(&self) -> Result<CycleReport, StockError> {
        (**self).run_cycle().await
    }
}

/// Where the scrape job is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed (before start, or after stop)
    Idle,
    /// A single timer is pending
    Armed { delay: Duration, due: Instant },
    /// A cycle is in progress
    Running,
}

/// Owns the recurring scrape job and reschedules it after every cycle
pub struct AdaptiveScheduler<R> {
    runner: R,
    policy: SchedulePolicy,
    state: Mutex<SchedulerState>,
    /// Handle of the pending timer task, if any
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Held for the whole duration of a cycle
    in_flight: tokio::sync::Mutex<()>,
}

impl<R: CycleRunner> AdaptiveScheduler<R> {
    /// Creates a scheduler in the `Idle` state
    pub fn new(runner: R, policy: SchedulePolicy) -> Arc<Self> {
        Arc::new(Self {
            runner,
            policy,
            state: Mutex::new(SchedulerState::Idle),
            timer: Mutex::new(None),
            in_flight: tokio::sync::Mutex::new(()),
        })
    }

    /// Arms the first run
    ///
    /// With `run_immediately` the first cycle fires right away; otherwise it
    /// waits the default delay.
    pub fn start(self: &Arc<Self>, run_immediately: bool) {
        let delay = if run_immediately {
            Duration::ZERO
        } else {
            Duration::from_secs(DEFAULT_DELAY_SECS)
        };
        self.arm(delay);
    }

    pub fn state(&self) -> SchedulerState {
        *lock(&self.state)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// Replaces the pending timer with one firing after `delay`
    ///
    /// Delays longer than the policy maximum are capped.
    pub fn arm(self: &Arc<Self>, delay: Duration) {
        let delay = delay.min(max_delay());
        let due = Instant::now() + delay;
        let mut timer = lock(&self.timer);

        if let Some(previous) = timer.take() {
            previous.abort();
        }

        *lock(&self.state) = SchedulerState::Armed { delay, due };

        let scheduler = Arc::clone(self);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(due).await;
            scheduler.fire().await;
        }));

        tracing::info!("Next scrape scheduled in {}s", delay.as_secs());
    }

    /// Runs a cycle now, outside the timer, then re-arms
    ///
    /// Waits for any cycle already in flight instead of running alongside it.
    /// The cycle runs on its own task, so dropping the returned future does
    /// not cut it short.
    pub async fn refresh_now(self: &Arc<Self>) -> Result<CycleReport, StockError> {
        let scheduler = Arc::clone(self);
        let cycle = tokio::spawn(async move {
            let _in_flight = scheduler.in_flight.lock().await;
            tracing::info!("Forced refresh started");

            let (delay, outcome) = scheduler.execute().await;
            scheduler.arm(delay);
            outcome
        });

        cycle.await.unwrap_or_else(|e| {
            Err(StockError::Unexpected(format!("refresh task failed: {}", e)))
        })
    }

    /// Cancels the pending timer
    ///
    /// A cycle already running is not interrupted and will re-arm when it ends.
    pub fn stop(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
        *lock(&self.state) = SchedulerState::Idle;
        tracing::info!("Scheduler stopped");
    }

    async fn fire(self: Arc<Self>) {
        let _in_flight = self.in_flight.lock().await;

        // This timer has fired; the slot must not hold a handle to the running task
        lock(&self.timer).take();

        let (delay, _) = self.execute().await;
        self.arm(delay);
    }

    async fn execute(&self) -> (Duration, Result<CycleReport, StockError>) {
        *lock(&self.state) = SchedulerState::Running;

        let outcome = match AssertUnwindSafe(self.runner.run_cycle())
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => Err(StockError::Unexpected(panic_message(panic.as_ref()))),
        };

        match &outcome {
            Ok(report) => tracing::info!(
                "Scrape cycle complete: {} items in {} sections",
                report.total_items(),
                report.sections_found
            ),
            Err(e) if e.is_fetch_failure() => tracing::error!("Scrape fetch failed: {}", e),
            Err(e) => tracing::error!("Scrape cycle failed: {:?}", e),
        }

        let delay = self.policy.next_delay(&outcome);
        if outcome.is_err() {
            tracing::warn!("Retrying in {}s", delay.as_secs());
        }

        (delay, outcome)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("cycle panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("cycle panicked: {}", message)
    } else {
        "cycle panicked".to_string()
    }
}
