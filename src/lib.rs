//! # Execution Monitor
//!
//! A simulated workflow execution monitor. An execution is an ordered list
//! of steps; a ticker advances it one step transition at a time, and
//! metrics are derived from the steps after every change.
//!
//! ## Features
//!
//! - **Declarative YAML plans** - Describe the steps of an execution
//! - **Deterministic simulation** - Seedable or forced transition sources
//! - **Lifecycle-bound ticker** - Dropping the handle stops the execution
//! - **Exportable reports** - JSON export and plain-text summaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use execution_monitor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let plan = PlanLoader::from_str(r#"
//! name: nightly-import
//! steps:
//!   - id: fetch
//!     name: Fetch Data
//!   - id: analyze
//!     name: AI Analysis
//! "#)?;
//!
//!     let config = SimulationConfig { seed: Some(42), ..Default::default() };
//!     let sim = ExecutionSimulation::from_config(plan, config.clone())?;
//!     let handle = Ticker::from_config(&config).spawn(sim, NullSink);
//!     let (sim, _reason) = handle.join().await?;
//!
//!     println!("progress: {:.0}%", sim.metrics().progress_percent);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod plan;
pub mod view;

// Re-export main types
pub use engine::{
    ExecutionMetrics, ExecutionReport, ExecutionSimulation, ExecutionStatus, ForcedSource,
    MockClock, MonitorEvent, SeededSource, SimulationError, StopReason, TickOutcome, Ticker,
    TickerHandle, TransitionSource,
};
pub use plan::{
    ConfigError, ExecutionPlan, ExecutionStep, LoadError, PlanError, PlanLoader,
    SimulationConfig, StepKind, StepSpec, StepStatus,
};
pub use view::MonitorView;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{
        EventSink, EventType, ExecutionMetrics, ExecutionReport, ExecutionSimulation,
        ExecutionStatus, ForcedSource, MockClock, MonitorEvent, NullSink, SeededSource,
        SimulationError, StopReason, TickOutcome, Ticker, TickerHandle, TransitionSource,
    };
    pub use crate::plan::{
        presets, ExecutionPlan, ExecutionStep, PlanLoader, SimulationConfig, StepKind, StepSpec,
        StepStatus, ValueRange,
    };
    pub use crate::view::MonitorView;
}
