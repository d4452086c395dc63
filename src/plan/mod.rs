//! Execution plan types and definitions
//!
//! This module contains all types for describing a simulated execution:
//! - `step` - StepStatus, StepKind, StepSpec and the live ExecutionStep
//! - `execution_plan` - ExecutionPlan and its validation rules
//! - `config` - SimulationConfig loaded from `monitor.yaml`
//! - `loader` - Load plans from files and directories
//! - `presets` - Built-in plans

pub mod config;
pub mod execution_plan;
pub mod loader;
pub mod presets;
pub mod step;

pub use config::{parse_duration, ConfigError, SimulationConfig, ValueRange};
pub use execution_plan::{ExecutionPlan, PlanError};
pub use loader::{LoadError, PlanLoader};
pub use step::{ExecutionStep, StepKind, StepSpec, StepStatus};
