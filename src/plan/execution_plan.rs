//! Execution plan definition and validation

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::step::{StepSpec, StepStatus};

/// Errors found while validating a plan
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Step at position {0} has an empty id")]
    EmptyStepId(usize),

    #[error("Invalid step id '{0}': only letters, digits, '_', '-' and '.' are allowed")]
    InvalidStepId(String),

    #[error("Duplicate step id: {0}")]
    DuplicateStepId(String),

    #[error("Step '{step}' has an invalid {field}: expected a finite, non-negative number")]
    InvalidValue { step: String, field: &'static str },

    #[error("More than one running step: {0:?}")]
    MultipleRunning(Vec<String>),

    #[error("Step '{step}' is {status} but an earlier step has not completed")]
    OutOfOrder { step: String, status: StepStatus },
}

fn step_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("static pattern"))
}

fn invalid_amount(value: f64) -> bool {
    !value.is_finite() || value < 0.0
}

/// An ordered list of steps for one simulated execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Workflow name (required)
    pub name: String,

    /// Identifier of the workflow this execution belongs to
    #[serde(default)]
    pub workflow_id: Option<String>,

    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl ExecutionPlan {
    pub fn new(name: impl Into<String>, steps: Vec<StepSpec>) -> Self {
        Self {
            name: name.into(),
            workflow_id: None,
            steps,
        }
    }

    /// Check ids, values and the ordering of initial statuses.
    ///
    /// Initial statuses must read as a prefix of completed steps, then at
    /// most one running or failed step, then only pending steps.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut seen = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if step.id.is_empty() {
                return Err(PlanError::EmptyStepId(index));
            }
            if !step_id_pattern().is_match(&step.id) {
                return Err(PlanError::InvalidStepId(step.id.clone()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(PlanError::DuplicateStepId(step.id.clone()));
            }
            if step.cost.is_some_and(invalid_amount) {
                return Err(PlanError::InvalidValue {
                    step: step.id.clone(),
                    field: "cost",
                });
            }
            if step.duration.is_some_and(invalid_amount) {
                return Err(PlanError::InvalidValue {
                    step: step.id.clone(),
                    field: "duration",
                });
            }
        }

        let running: Vec<String> = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Running)
            .map(|s| s.id.clone())
            .collect();
        if running.len() > 1 {
            return Err(PlanError::MultipleRunning(running));
        }

        let mut frontier_reached = false;
        for step in &self.steps {
            match step.status {
                StepStatus::Completed if !frontier_reached => {}
                StepStatus::Pending => frontier_reached = true,
                StepStatus::Running | StepStatus::Failed if !frontier_reached => {
                    frontier_reached = true;
                }
                status => {
                    return Err(PlanError::OutOfOrder {
                        step: step.id.clone(),
                        status,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
