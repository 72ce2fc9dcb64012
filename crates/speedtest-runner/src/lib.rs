//! speedtest-runner — acquires one measurement per run.
//!
//! # Architecture
//!
//! ```text
//! Runner::run()
//!   ├── for each Target in preference order
//!   │     ├── SpeedtestTool::measure()  (bounded by the per-attempt timeout)
//!   │     └── ookla::parse_report()     → MeasurementResult
//!   └── RunError::Exhausted when no candidate succeeds
//! ```

pub mod error;
pub mod ookla;
pub mod runner;
pub mod tool;

pub use error::{AttemptError, AttemptFailure, RunError, RunResult};
pub use runner::Runner;
pub use tool::{CommandTool, SpeedtestTool};
