//! Simulation error types

use crate::plan::{ConfigError, LoadError, PlanError};

/// Errors that can occur while setting up or driving a simulation
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Load error: {0}")]
    LoadError(#[from] LoadError),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Step not found: {0}")]
    StepNotFound(String),

    #[error("Ticker task failed: {0}")]
    TickerFailed(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
