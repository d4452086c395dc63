//! Execution Simulation - the registry of steps for one execution
//!
//! Owns the ordered steps and moves them along one tick at a time:
//! 1. Find the running step (at most one exists)
//! 2. Ask the transition source whether it completes this tick
//! 3. Stamp duration, cost and credits on completion
//! 4. Promote the next pending step, or finish the execution
//!
//! The caller owns the cadence; see [`crate::engine::ticker`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::clock::MockClock;
use crate::engine::error::SimulationError;
use crate::engine::metrics::ExecutionMetrics;
use crate::engine::random::{SeededSource, TransitionSource};
use crate::plan::{ExecutionPlan, ExecutionStep, SimulationConfig, StepStatus};

/// Overall status of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    fn derive(steps: &[ExecutionStep]) -> Self {
        if steps.iter().any(|s| s.status == StepStatus::Failed) {
            ExecutionStatus::Failed
        } else if steps.iter().all(|s| s.status == StepStatus::Completed) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Running
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Running => f.write_str("running"),
            ExecutionStatus::Completed => f.write_str("completed"),
            ExecutionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No step is running
    Idle,
    /// The running step did not complete this tick
    Stuck { step_id: String },
    /// A step completed and the next one started
    Advanced { completed: String, started: String },
    /// The last step completed
    Finished { completed: String },
}

impl TickOutcome {
    pub fn transitioned(&self) -> bool {
        matches!(
            self,
            TickOutcome::Advanced { .. } | TickOutcome::Finished { .. }
        )
    }
}

pub struct ExecutionSimulation {
    id: String,
    plan: ExecutionPlan,
    steps: Vec<ExecutionStep>,
    status: ExecutionStatus,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    ticks: u64,
    config: SimulationConfig,
    clock: MockClock,
    source: Box<dyn TransitionSource>,
}

impl std::fmt::Debug for ExecutionSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSimulation")
            .field("id", &self.id)
            .field("workflow", &self.plan.name)
            .field("status", &self.status)
            .field("steps", &self.steps)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

fn new_execution_id() -> String {
    format!("exec_{}", Uuid::new_v4().simple())
}

impl ExecutionSimulation {
    /// Start an execution on the real-time clock
    pub fn start(
        plan: ExecutionPlan,
        config: SimulationConfig,
        source: impl TransitionSource + 'static,
    ) -> Result<Self, SimulationError> {
        Self::start_with_clock(plan, config, source, MockClock::new())
    }

    /// Start an execution with a source seeded from `config.seed`
    pub fn from_config(plan: ExecutionPlan, config: SimulationConfig) -> Result<Self, SimulationError> {
        let source = SeededSource::from_seed_option(config.seed);
        Self::start(plan, config, source)
    }

    pub fn start_with_clock(
        plan: ExecutionPlan,
        config: SimulationConfig,
        source: impl TransitionSource + 'static,
        clock: MockClock,
    ) -> Result<Self, SimulationError> {
        plan.validate()?;
        config.validate()?;

        let steps = plan.steps.iter().map(ExecutionStep::from).collect();
        let mut simulation = Self {
            id: new_execution_id(),
            plan,
            steps,
            status: ExecutionStatus::Running,
            started_at: clock.now(),
            finished_at: None,
            ticks: 0,
            config,
            clock,
            source: Box::new(source),
        };
        simulation.begin();

        info!(
            execution_id = %simulation.id,
            workflow = %simulation.plan.name,
            steps = simulation.steps.len(),
            status = %simulation.status,
            "Execution started"
        );
        Ok(simulation)
    }

    /// Promote the first pending step if nothing is running or failed, then
    /// settle the status
    fn begin(&mut self) {
        let now = self.clock.now();
        self.started_at = now;

        let blocked = self
            .steps
            .iter()
            .any(|s| matches!(s.status, StepStatus::Running | StepStatus::Failed));
        if !blocked {
            if let Some(next) = self.steps.iter_mut().find(|s| s.status == StepStatus::Pending) {
                next.status = StepStatus::Running;
            }
        }
        if let Some(running) = self.steps.iter_mut().find(|s| s.is_running()) {
            running.started_at = Some(now);
        }

        self.status = ExecutionStatus::derive(&self.steps);
        self.finished_at = (self.status != ExecutionStatus::Running).then_some(now);
    }

    /// Run one tick of the simulation
    pub fn advance(&mut self) -> TickOutcome {
        self.ticks += 1;

        let Some(index) = self.steps.iter().position(|s| s.is_running()) else {
            debug!(execution_id = %self.id, tick = self.ticks, "No running step");
            return TickOutcome::Idle;
        };

        if !self.source.should_complete(self.config.completion_probability) {
            debug!(
                execution_id = %self.id,
                tick = self.ticks,
                step = %self.steps[index].id,
                "Step still running"
            );
            return TickOutcome::Stuck {
                step_id: self.steps[index].id.clone(),
            };
        }

        let now = self.clock.now();
        let duration = self.source.sample(self.config.duration_range);
        let cost = self.source.sample(self.config.cost_range);
        let credits = (cost * self.config.credits_per_cost).round() as u64;

        let step = &mut self.steps[index];
        step.status = StepStatus::Completed;
        step.duration_seconds = Some(duration);
        step.cost = Some(cost);
        step.credits_used = Some(credits);
        step.finished_at = Some(now);
        step.logs.push(format!("Completed in {:.2}s", duration));
        let completed = step.id.clone();

        info!(
            execution_id = %self.id,
            step = %completed,
            duration_seconds = duration,
            cost,
            "Step completed"
        );

        match self.steps.iter_mut().find(|s| s.status == StepStatus::Pending) {
            Some(next) => {
                next.status = StepStatus::Running;
                next.started_at = Some(now);
                let started = next.id.clone();
                info!(execution_id = %self.id, step = %started, "Step started");
                TickOutcome::Advanced { completed, started }
            }
            None => {
                self.status = ExecutionStatus::Completed;
                self.finished_at = Some(now);
                info!(
                    execution_id = %self.id,
                    ticks = self.ticks,
                    "Execution completed"
                );
                TickOutcome::Finished { completed }
            }
        }
    }

    /// Alias for [`advance`](Self::advance), as called by a timer
    pub fn tick(&mut self) -> TickOutcome {
        self.advance()
    }

    /// Run the plan again from the first step under a new execution id
    pub fn restart(&mut self) {
        self.id = new_execution_id();
        self.steps = self
            .plan
            .steps
            .iter()
            .map(|spec| {
                let mut step = ExecutionStep::from(spec);
                step.reset();
                step.logs.clear();
                step
            })
            .collect();
        self.ticks = 0;
        self.begin();

        info!(execution_id = %self.id, workflow = %self.plan.name, "Execution restarted");
    }

    pub fn metrics(&self) -> ExecutionMetrics {
        ExecutionMetrics::from_steps(&self.steps)
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Result<&ExecutionStep, SimulationError> {
        self.steps
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SimulationError::StepNotFound(id.to_string()))
    }

    pub fn running_step(&self) -> Option<&ExecutionStep> {
        self.steps.iter().find(|s| s.is_running())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn workflow_name(&self) -> &str {
        &self.plan.name
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != ExecutionStatus::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut MockClock {
        &mut self.clock
    }
}
