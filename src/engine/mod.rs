//! Execution simulation engine module
//!
//! This module contains:
//! - `simulation` - The step registry and its tick transition
//! - `metrics` - Metrics derived from the step sequence
//! - `random` - Injectable transition sources
//! - `clock` - Virtual clock for timestamps
//! - `ticker` - Interval driver with lifecycle-bound cancellation
//! - `events` - Events emitted as the execution progresses
//! - `report` - Exportable execution report
//! - `error` - Simulation error types

pub mod clock;
pub mod error;
pub mod events;
pub mod metrics;
pub mod random;
pub mod report;
pub mod simulation;
pub mod ticker;

pub use clock::{parse_time, ClockError, MockClock};
pub use error::SimulationError;
pub use events::{EventSink, EventType, MonitorEvent, NullSink};
pub use metrics::{cost_breakdown, progress_percent, ExecutionMetrics, StepCost};
pub use random::{ForcedSource, SeededSource, TransitionSource};
pub use report::ExecutionReport;
pub use simulation::{ExecutionSimulation, ExecutionStatus, TickOutcome};
pub use ticker::{StopReason, Ticker, TickerHandle};
