//! Text rendering of a running execution
//!
//! The view only reads the simulation. Expanding a step to show its logs is
//! view state and never feeds back into the execution.

use std::collections::HashSet;

use crate::engine::{ExecutionMetrics, ExecutionSimulation};
use crate::plan::{ExecutionStep, StepStatus};

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct MonitorView {
    expanded: HashSet<String>,
}

impl MonitorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a step between expanded and collapsed; returns the new state
    pub fn toggle(&mut self, step_id: &str) -> bool {
        if self.expanded.remove(step_id) {
            false
        } else {
            self.expanded.insert(step_id.to_string());
            true
        }
    }

    pub fn expand_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.expanded.extend(ids.into_iter().map(str::to_string));
    }

    pub fn is_expanded(&self, step_id: &str) -> bool {
        self.expanded.contains(step_id)
    }

    pub fn render(&self, sim: &ExecutionSimulation) -> String {
        let metrics = sim.metrics();
        let mut out = String::new();

        out.push_str(&format!("{} ({})\n", sim.workflow_name(), sim.id()));
        out.push_str(&format!(
            "{} {:>3.0}%  {} of {} steps\n",
            progress_bar(&metrics),
            metrics.progress_percent,
            metrics.completed_steps,
            metrics.total_steps
        ));
        out.push_str(&format!(
            "duration {:.1}s  cost ${:.2}  credits {}  status {}\n",
            metrics.total_duration_seconds,
            metrics.total_cost,
            metrics.total_credits,
            sim.status()
        ));

        for step in sim.steps() {
            out.push_str(&self.render_step(step));
        }
        out
    }

    fn render_step(&self, step: &ExecutionStep) -> String {
        let mut line = format!("  {} {}", status_icon(step.status), step.name);
        if let Some(duration) = step.duration_seconds {
            line.push_str(&format!("  {:.2}s", duration));
        }
        if let Some(cost) = step.cost {
            line.push_str(&format!("  ${:.2}", cost));
        }
        if let Some(provider) = &step.provider {
            line.push_str(&format!("  via {}", provider));
        }
        line.push('\n');

        if self.is_expanded(&step.id) {
            for log in &step.logs {
                line.push_str(&format!("      > {}\n", log));
            }
        }
        line
    }
}

fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "[x]",
        StepStatus::Running => "[>]",
        StepStatus::Failed => "[!]",
        StepStatus::Pending => "[ ]",
    }
}

fn progress_bar(metrics: &ExecutionMetrics) -> String {
    let filled = ((metrics.progress_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
