use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiscoveryError;
use crate::telemetry::collector::{CollectionResult, Collector};
use crate::telemetry::types::Category;

/// Upper bound on how long a pending inter-sample sleep can delay a
/// cancellation signal.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `samples_taken` reached `max_samples`.
    Exhausted,
    /// External cancellation signal (user interrupt).
    Cancelled,
}

/// Bookkeeping for one run of the sampling loop; created on start and
/// discarded when the loop exits.
#[derive(Debug)]
pub struct SamplingSession {
    pub interval: Duration,
    pub max_samples: Option<u64>,
    pub samples_taken: u64,
    pub started_at: DateTime<Utc>,
    pub stop_reason: StopReason,
}

impl SamplingSession {
    fn exhausted(&self) -> bool {
        self.max_samples
            .map_or(false, |max| self.samples_taken >= max)
    }
}

/// Anything the scheduler can repeatedly sample. The indirection keeps the
/// pacing logic independent of live HTTP.
#[async_trait]
pub trait SampleSource {
    async fn sample(&mut self) -> Result<CollectionResult, DiscoveryError>;
}

/// A collector pinned to a fixed category set.
pub struct CategorySampler<'a> {
    collector: &'a mut Collector,
    categories: BTreeSet<Category>,
}

impl<'a> CategorySampler<'a> {
    pub fn new(collector: &'a mut Collector, categories: BTreeSet<Category>) -> Self {
        Self {
            collector,
            categories,
        }
    }
}

#[async_trait]
impl SampleSource for CategorySampler<'_> {
    async fn sample(&mut self) -> Result<CollectionResult, DiscoveryError> {
        self.collector.collect(&self.categories).await
    }
}

/// Drives a [`SampleSource`] on a fixed interval: `Idle` until [`run`] is
/// called, `Running` for the life of the loop, `Stopped` once the sample
/// count is exhausted or the cancellation flag is raised.
///
/// [`run`]: Scheduler::run
pub struct Scheduler {
    interval: Duration,
    max_samples: Option<u64>,
    cancel: Arc<AtomicBool>,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(interval: Duration, max_samples: Option<u64>, cancel: Arc<AtomicBool>) -> Self {
        Self {
            interval,
            max_samples,
            cancel,
            state: SchedulerState::Idle,
        }
    }

    /// One-shot collection is the degenerate bounded case.
    pub fn single_shot(cancel: Arc<AtomicBool>) -> Self {
        Self::new(Duration::ZERO, Some(1), cancel)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run the loop to completion. `sink` sees every sample as soon as it is
    /// collected, so partial output survives a later cancellation. Per-sample
    /// extraction failures are surfaced and the loop keeps going; only a
    /// discovery failure is fatal.
    pub async fn run<S, F>(
        &mut self,
        source: &mut S,
        mut sink: F,
    ) -> Result<SamplingSession, DiscoveryError>
    where
        S: SampleSource + Send,
        F: FnMut(u64, &CollectionResult),
    {
        let mut session = SamplingSession {
            interval: self.interval,
            max_samples: self.max_samples,
            samples_taken: 0,
            started_at: Utc::now(),
            stop_reason: StopReason::Exhausted,
        };
        self.state = SchedulerState::Running;

        let reason = loop {
            if self.cancelled() {
                break StopReason::Cancelled;
            }

            let result = match source.sample().await {
                Ok(result) => result,
                Err(err) => {
                    self.state = SchedulerState::Stopped;
                    return Err(err);
                }
            };
            for (category, err) in &result.errors {
                warn!("sample {}: {} failed: {}", session.samples_taken + 1, category, err);
            }

            session.samples_taken += 1;
            sink(session.samples_taken, &result);

            if session.exhausted() {
                break StopReason::Exhausted;
            }
            if !self.pause().await {
                break StopReason::Cancelled;
            }
        };

        session.stop_reason = reason;
        self.state = SchedulerState::Stopped;
        info!(
            "sampling stopped after {} sample(s) in {}s ({:?})",
            session.samples_taken,
            (Utc::now() - session.started_at).num_seconds(),
            session.stop_reason
        );
        Ok(session)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Sleep out the inter-sample interval in slices so a cancellation lands
    /// within [`SLEEP_SLICE`], not after the full remaining interval. Returns
    /// false if cancelled mid-sleep.
    async fn pause(&self) -> bool {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO {
            if self.cancelled() {
                return false;
            }
            let step = remaining.min(SLEEP_SLICE);
            tokio::time::sleep(step).await;
            remaining -= step;
        }
        !self.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        calls: u64,
    }

    #[async_trait]
    impl SampleSource for CountingSource {
        async fn sample(&mut self) -> Result<CollectionResult, DiscoveryError> {
            self.calls += 1;
            Ok(CollectionResult::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_run_takes_exactly_max_samples() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut scheduler = Scheduler::new(Duration::from_secs(5), Some(3), cancel);
        let mut source = CountingSource { calls: 0 };
        let mut sink_calls = 0u64;

        let session = scheduler
            .run(&mut source, |_, _| sink_calls += 1)
            .await
            .unwrap();

        assert_eq!(source.calls, 3);
        assert_eq!(sink_calls, 3);
        assert_eq!(session.samples_taken, 3);
        assert_eq!(session.stop_reason, StopReason::Exhausted);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn single_shot_never_sleeps() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut scheduler = Scheduler::single_shot(cancel);
        let mut source = CountingSource { calls: 0 };

        let session = scheduler.run(&mut source, |_, _| {}).await.unwrap();

        assert_eq!(source.calls, 1);
        assert_eq!(session.samples_taken, 1);
        assert_eq!(session.stop_reason, StopReason::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_sleep_stops_before_next_sample() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut scheduler = Scheduler::new(Duration::from_secs(60), None, cancel.clone());
        let mut source = CountingSource { calls: 0 };
        let mut emitted = 0u64;

        let flag = cancel.clone();
        tokio::spawn(async move {
            // lands inside the first inter-sample sleep
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let session = scheduler
            .run(&mut source, |_, _| emitted += 1)
            .await
            .unwrap();

        // the in-flight sample's output was emitted and no new sample started
        assert_eq!(source.calls, 1);
        assert_eq!(emitted, 1);
        assert_eq!(session.samples_taken, 1);
        assert_eq!(session.stop_reason, StopReason::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_run_takes_no_samples() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut scheduler = Scheduler::new(Duration::from_secs(1), Some(5), cancel);
        let mut source = CountingSource { calls: 0 };

        let session = scheduler.run(&mut source, |_, _| {}).await.unwrap();

        assert_eq!(source.calls, 0);
        assert_eq!(session.samples_taken, 0);
        assert_eq!(session.stop_reason, StopReason::Cancelled);
    }
}
