//! Step definitions
//!
//! `StepSpec` is what a plan file declares; `ExecutionStep` is the live,
//! mutable record the simulation keeps for each step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    /// Completed and failed steps never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of work a step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Input,
    #[default]
    Process,
    Decision,
    Review,
    Output,
}

/// A step as declared in a plan file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    /// Unique identifier (required)
    pub id: String,

    /// Display label (required)
    pub name: String,

    #[serde(default)]
    pub kind: StepKind,

    /// Initial status, for plans that start mid-execution
    #[serde(default)]
    pub status: StepStatus,

    /// Duration in seconds, if already known
    #[serde(default)]
    pub duration: Option<f64>,

    /// Cost, if already known
    #[serde(default)]
    pub cost: Option<f64>,

    /// Credits consumed, if already known
    #[serde(default)]
    pub credits: Option<u64>,

    /// Service that performs the step
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub logs: Vec<String>,
}

impl StepSpec {
    /// Create a pending process step
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: StepKind::default(),
            status: StepStatus::Pending,
            duration: None,
            cost: None,
            credits: None,
            provider: None,
            logs: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Mark as already completed with known duration and cost
    pub fn completed(mut self, duration: f64, cost: f64) -> Self {
        self.status = StepStatus::Completed;
        self.duration = Some(duration);
        self.cost = Some(cost);
        self
    }

    pub fn with_logs<I, S>(mut self, logs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logs = logs.into_iter().map(Into::into).collect();
        self
    }
}

/// One step of a live execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub id: String,
    pub name: String,
    pub kind: StepKind,
    pub status: StepStatus,

    /// Set once the step leaves `running`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionStep {
    pub fn is_running(&self) -> bool {
        self.status == StepStatus::Running
    }

    /// Drop everything stamped by a previous run
    pub(crate) fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.duration_seconds = None;
        self.cost = None;
        self.credits_used = None;
        self.started_at = None;
        self.finished_at = None;
    }
}

impl From<&StepSpec> for ExecutionStep {
    fn from(spec: &StepSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            kind: spec.kind,
            status: spec.status,
            duration_seconds: spec.duration,
            cost: spec.cost,
            credits_used: spec.credits,
            provider: spec.provider.clone(),
            logs: spec.logs.clone(),
            started_at: None,
            finished_at: None,
        }
    }
}
