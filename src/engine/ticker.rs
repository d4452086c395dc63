//! Progress Ticker - drives a simulation on a fixed interval
//!
//! Each interval calls [`ExecutionSimulation::advance`] exactly once. The
//! loop ends when the execution finishes, the tick limit is reached, or the
//! cancellation token fires. A spawned ticker is tied to its
//! [`TickerHandle`]: dropping the handle cancels the ticker, so a discarded
//! monitor never keeps mutating its execution.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, instrument};

use crate::engine::error::SimulationError;
use crate::engine::events::{EventSink, MonitorEvent};
use crate::engine::simulation::{ExecutionSimulation, ExecutionStatus};
use crate::plan::SimulationConfig;

/// Why a ticker loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Finished,
    Cancelled,
    TickLimit,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    max_ticks: Option<u64>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            interval: config.tick_interval,
            max_ticks: config.max_ticks,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Drive `sim` until it finishes, hits the tick limit, or `cancel` fires
    #[instrument(skip_all, fields(execution_id = %sim.id()))]
    pub async fn run<S>(
        &self,
        sim: &mut ExecutionSimulation,
        sink: &S,
        cancel: &CancellationToken,
    ) -> StopReason
    where
        S: EventSink + ?Sized,
    {
        let started = MonitorEvent::execution_started(sim);
        sink.emit(started).await;

        if sim.is_finished() {
            if sim.status() == ExecutionStatus::Completed {
                sink.emit(MonitorEvent::execution_completed(sim)).await;
            }
            return StopReason::Finished;
        }

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately
        interval.tick().await;

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(ticks, "Ticker cancelled");
                    return StopReason::Cancelled;
                }
                _ = interval.tick() => {}
            }

            sim.clock_mut().forward(self.interval);
            let outcome = sim.advance();
            ticks += 1;
            debug!(ticks, ?outcome, "Tick");

            let events = MonitorEvent::from_outcome(sim, &outcome);
            for event in events {
                sink.emit(event).await;
            }

            if sim.is_finished() {
                return StopReason::Finished;
            }
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                info!(ticks, "Tick limit reached");
                return StopReason::TickLimit;
            }
        }
    }

    /// Move `sim` onto its own task and tick it there
    pub fn spawn<S>(self, mut sim: ExecutionSimulation, sink: S) -> TickerHandle
    where
        S: EventSink + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let reason = self.run(&mut sim, &sink, &token).await;
            (sim, reason)
        });

        TickerHandle {
            cancel: cancel.clone(),
            guard: cancel.drop_guard(),
            task,
        }
    }
}

/// Owner of a spawned ticker; dropping it cancels the ticker
pub struct TickerHandle {
    cancel: CancellationToken,
    guard: DropGuard,
    task: JoinHandle<(ExecutionSimulation, StopReason)>,
}

impl TickerHandle {
    /// Ask the ticker to stop at its next await point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel the ticker and take the simulation back
    pub async fn stop(self) -> Result<(ExecutionSimulation, StopReason), SimulationError> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the ticker to stop on its own
    pub async fn join(self) -> Result<(ExecutionSimulation, StopReason), SimulationError> {
        let TickerHandle { guard, task, .. } = self;
        let result = task
            .await
            .map_err(|e| SimulationError::TickerFailed(e.to_string()));
        drop(guard);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::NullSink;
    use crate::engine::random::ForcedSource;
    use crate::plan::{ExecutionPlan, StepSpec};

    fn sim(source: ForcedSource) -> ExecutionSimulation {
        let plan = ExecutionPlan::new(
            "ticker",
            vec![StepSpec::new("a", "A"), StepSpec::new("b", "B")],
        );
        ExecutionSimulation::start(plan, SimulationConfig::default(), source).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_finished() {
        let mut sim = sim(ForcedSource::always());
        let ticker = Ticker::new(Duration::from_millis(1500));
        let reason = ticker.run(&mut sim, &NullSink, &CancellationToken::new()).await;

        assert_eq!(reason, StopReason::Finished);
        assert_eq!(sim.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_limit() {
        let mut sim = sim(ForcedSource::never());
        let ticker = Ticker::new(Duration::from_secs(3)).with_max_ticks(Some(5));
        let reason = ticker.run(&mut sim, &NullSink, &CancellationToken::new()).await;

        assert_eq!(reason, StopReason::TickLimit);
        assert_eq!(sim.ticks(), 5);
        assert_eq!(sim.metrics().completed_steps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_tick() {
        let mut sim = sim(ForcedSource::always());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reason = Ticker::new(Duration::from_secs(1))
            .run(&mut sim, &NullSink, &cancel)
            .await;

        assert_eq!(reason, StopReason::Cancelled);
        assert_eq!(sim.ticks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_finished_plan_emits_both_events() {
        use crate::engine::events::EventType;

        let (tx, rx) = async_channel::unbounded::<MonitorEvent>();
        let mut sim = ExecutionSimulation::start(
            ExecutionPlan::new("empty", Vec::new()),
            SimulationConfig::default(),
            ForcedSource::always(),
        )
        .unwrap();

        let reason = Ticker::new(Duration::from_secs(1))
            .run(&mut sim, &tx, &CancellationToken::new())
            .await;
        drop(tx);

        assert_eq!(reason, StopReason::Finished);
        assert_eq!(sim.ticks(), 0);
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::ExecutionStarted);
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::ExecutionCompleted);
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initially_failed_plan_does_not_report_completion() {
        let (tx, rx) = async_channel::unbounded::<MonitorEvent>();
        let plan = ExecutionPlan::new(
            "failed",
            vec![StepSpec::new("a", "A").with_status(crate::plan::StepStatus::Failed)],
        );
        let mut sim =
            ExecutionSimulation::start(plan, SimulationConfig::default(), ForcedSource::always())
                .unwrap();

        Ticker::new(Duration::from_secs(1))
            .run(&mut sim, &tx, &CancellationToken::new())
            .await;
        drop(tx);

        assert_eq!(rx.len(), 1);
    }
}
