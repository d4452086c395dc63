//! Events emitted while an execution progresses

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::metrics::ExecutionMetrics;
use crate::engine::simulation::{ExecutionSimulation, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ExecutionStarted,
    StepStarted,
    StepCompleted,
    ExecutionCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorEvent {
    pub event_type: EventType,
    pub execution_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ExecutionMetrics>,
}

impl MonitorEvent {
    fn new(event_type: EventType, sim: &ExecutionSimulation) -> Self {
        Self {
            event_type,
            execution_id: sim.id().to_string(),
            timestamp: sim.clock().now(),
            step_id: None,
            step_name: None,
            metrics: None,
        }
    }

    fn for_step(event_type: EventType, sim: &ExecutionSimulation, step_id: &str) -> Self {
        let mut event = Self::new(event_type, sim);
        event.step_name = sim.step(step_id).ok().map(|s| s.name.clone());
        event.step_id = Some(step_id.to_string());
        event
    }

    pub fn execution_started(sim: &ExecutionSimulation) -> Self {
        let mut event = Self::new(EventType::ExecutionStarted, sim);
        event.timestamp = sim.started_at();
        event.metrics = Some(sim.metrics());
        event
    }

    pub fn execution_completed(sim: &ExecutionSimulation) -> Self {
        let mut event = Self::new(EventType::ExecutionCompleted, sim);
        if let Some(finished) = sim.finished_at() {
            event.timestamp = finished;
        }
        event.metrics = Some(sim.metrics());
        event
    }

    /// Events describing a tick; empty when nothing changed
    pub fn from_outcome(sim: &ExecutionSimulation, outcome: &TickOutcome) -> Vec<Self> {
        match outcome {
            TickOutcome::Idle | TickOutcome::Stuck { .. } => Vec::new(),
            TickOutcome::Advanced { completed, started } => {
                let mut done = Self::for_step(EventType::StepCompleted, sim, completed);
                done.metrics = Some(sim.metrics());
                vec![done, Self::for_step(EventType::StepStarted, sim, started)]
            }
            TickOutcome::Finished { completed } => {
                let mut done = Self::for_step(EventType::StepCompleted, sim, completed);
                done.metrics = Some(sim.metrics());
                vec![done, Self::execution_completed(sim)]
            }
        }
    }
}

/// Receives events from a running ticker
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: MonitorEvent);
}

#[async_trait]
impl EventSink for async_channel::Sender<MonitorEvent> {
    async fn emit(&self, event: MonitorEvent) {
        // A closed channel means nobody is watching anymore
        if self.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: MonitorEvent) {}
}
