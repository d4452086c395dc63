//! Execution report - the "Export Results" payload
//!
//! A serializable snapshot of one execution: steps, metrics and timing.
//! Written as JSON, or rendered as a short plain-text summary.

use std::path::Path;

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::engine::error::SimulationError;
use crate::engine::metrics::{cost_breakdown, ExecutionMetrics, StepCost};
use crate::engine::simulation::{ExecutionSimulation, ExecutionStatus};
use crate::plan::ExecutionStep;

const SUMMARY_TEMPLATE: &str = "\
{{workflow}} ({{execution_id}})
Status: {{status}} | {{completed}}/{{total}} steps | {{progress}}%
Duration: {{duration}}s | Cost: ${{cost}} | Credits: {{credits}}
{{#each steps}}
  [{{this.status}}] {{this.name}}{{#if this.detail}} - {{this.detail}}{{/if}}
{{/each}}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub execution_id: String,
    pub workflow_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall time between start and finish, per the simulation clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
    pub ticks: u64,
    pub metrics: ExecutionMetrics,
    pub steps: Vec<ExecutionStep>,
    pub cost_breakdown: Vec<StepCost>,
}

impl From<&ExecutionSimulation> for ExecutionReport {
    fn from(sim: &ExecutionSimulation) -> Self {
        let elapsed_seconds = sim
            .finished_at()
            .map(|end| (end - sim.started_at()).num_milliseconds() as f64 / 1000.0);

        Self {
            execution_id: sim.id().to_string(),
            workflow_name: sim.workflow_name().to_string(),
            workflow_id: sim.plan().workflow_id.clone(),
            status: sim.status(),
            started_at: sim.started_at(),
            finished_at: sim.finished_at(),
            elapsed_seconds,
            ticks: sim.ticks(),
            metrics: sim.metrics(),
            steps: sim.steps().to_vec(),
            cost_breakdown: cost_breakdown(sim.steps()),
        }
    }
}

#[derive(Serialize)]
struct SummaryStep {
    status: String,
    name: String,
    detail: Option<String>,
}

#[derive(Serialize)]
struct SummaryView {
    workflow: String,
    execution_id: String,
    status: String,
    completed: usize,
    total: usize,
    progress: String,
    duration: String,
    cost: String,
    credits: u64,
    steps: Vec<SummaryStep>,
}

impl ExecutionReport {
    pub fn to_json_pretty(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| SimulationError::ReportError(e.to_string()))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SimulationError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn render_summary(&self) -> Result<String, SimulationError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        let view = SummaryView {
            workflow: self.workflow_name.clone(),
            execution_id: self.execution_id.clone(),
            status: self.status.to_string(),
            completed: self.metrics.completed_steps,
            total: self.metrics.total_steps,
            progress: format!("{:.0}", self.metrics.progress_percent),
            duration: format!("{:.1}", self.metrics.total_duration_seconds),
            cost: format!("{:.2}", self.metrics.total_cost),
            credits: self.metrics.total_credits,
            steps: self
                .steps
                .iter()
                .map(|step| SummaryStep {
                    status: step.status.to_string(),
                    name: step.name.clone(),
                    detail: step.duration_seconds.map(|d| match step.cost {
                        Some(cost) => format!("{:.2}s, ${:.2}", d, cost),
                        None => format!("{:.2}s", d),
                    }),
                })
                .collect(),
        };

        handlebars
            .render_template(SUMMARY_TEMPLATE, &view)
            .map_err(|e| SimulationError::ReportError(e.to_string()))
    }
}
