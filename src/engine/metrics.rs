//! Metrics derived from a step sequence
//!
//! Nothing here is stored: metrics are recomputed from the steps whenever
//! they are needed.

use serde::{Deserialize, Serialize};

use crate::plan::{ExecutionStep, StepStatus};

/// Aggregate counters over one execution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetrics {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub failed_steps: usize,
    pub running_steps: usize,

    /// Sum over completed steps
    pub total_duration_seconds: f64,

    /// Sum over completed steps
    pub total_cost: f64,

    /// Sum over completed steps
    pub total_credits: u64,

    /// `completed / total * 100`, clamped to [0, 100]; 0 with no steps
    pub progress_percent: f64,
}

impl ExecutionMetrics {
    pub fn from_steps(steps: &[ExecutionStep]) -> Self {
        let mut metrics = Self {
            total_steps: steps.len(),
            ..Self::default()
        };

        for step in steps {
            match step.status {
                StepStatus::Completed => {
                    metrics.completed_steps += 1;
                    metrics.total_duration_seconds += step.duration_seconds.unwrap_or(0.0);
                    metrics.total_cost += step.cost.unwrap_or(0.0);
                    metrics.total_credits += step.credits_used.unwrap_or(0);
                }
                StepStatus::Failed => metrics.failed_steps += 1,
                StepStatus::Running => metrics.running_steps += 1,
                StepStatus::Pending => {}
            }
        }

        metrics.progress_percent = progress_percent(metrics.completed_steps, metrics.total_steps);
        metrics
    }

    pub fn is_complete(&self) -> bool {
        self.total_steps > 0 && self.completed_steps == self.total_steps
    }
}

pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Per-step cost and duration, in step order, for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCost {
    pub id: String,
    pub name: String,
    pub status: StepStatus,
    pub cost: f64,
    pub duration_seconds: f64,
    pub credits: u64,
}

pub fn cost_breakdown(steps: &[ExecutionStep]) -> Vec<StepCost> {
    steps
        .iter()
        .map(|step| StepCost {
            id: step.id.clone(),
            name: step.name.clone(),
            status: step.status,
            cost: step.cost.unwrap_or(0.0),
            duration_seconds: step.duration_seconds.unwrap_or(0.0),
            credits: step.credits_used.unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StepSpec;

    fn steps(specs: &[StepSpec]) -> Vec<ExecutionStep> {
        specs.iter().map(ExecutionStep::from).collect()
    }

    #[test]
    fn test_empty_sequence() {
        let metrics = ExecutionMetrics::from_steps(&[]);
        assert_eq!(metrics.total_steps, 0);
        assert_eq!(metrics.completed_steps, 0);
        assert_eq!(metrics.progress_percent, 0.0);
        assert!(!metrics.is_complete());
    }

    #[test]
    fn test_sums_only_completed_steps() {
        let mut running = StepSpec::new("b", "B").with_status(StepStatus::Running);
        running.cost = Some(9.0);
        running.duration = Some(9.0);

        let steps = steps(&[
            StepSpec::new("a", "A").completed(2.3, 1.5),
            running,
            StepSpec::new("c", "C"),
            StepSpec::new("d", "D"),
        ]);
        let metrics = ExecutionMetrics::from_steps(&steps);

        assert_eq!(metrics.total_steps, 4);
        assert_eq!(metrics.completed_steps, 1);
        assert_eq!(metrics.running_steps, 1);
        assert_eq!(metrics.total_duration_seconds, 2.3);
        assert_eq!(metrics.total_cost, 1.5);
        assert_eq!(metrics.progress_percent, 25.0);
    }

    #[test]
    fn test_failed_steps_counted() {
        let steps = steps(&[
            StepSpec::new("a", "A").completed(1.0, 1.0),
            StepSpec::new("b", "B").with_status(StepStatus::Failed),
        ]);
        let metrics = ExecutionMetrics::from_steps(&steps);
        assert_eq!(metrics.failed_steps, 1);
        assert_eq!(metrics.progress_percent, 50.0);
    }

    #[test]
    fn test_aggregation_is_pure() {
        let steps = steps(&[
            StepSpec::new("a", "A").completed(1.25, 0.75),
            StepSpec::new("b", "B"),
            StepSpec::new("c", "C"),
        ]);
        assert_eq!(
            ExecutionMetrics::from_steps(&steps),
            ExecutionMetrics::from_steps(&steps)
        );
    }

    #[test]
    fn test_cost_breakdown_keeps_order() {
        let steps = steps(&[
            StepSpec::new("a", "A").completed(1.0, 0.5),
            StepSpec::new("b", "B"),
        ]);
        let breakdown = cost_breakdown(&steps);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].cost, 0.5);
        assert_eq!(breakdown[1].id, "b");
        assert_eq!(breakdown[1].cost, 0.0);
    }
}
