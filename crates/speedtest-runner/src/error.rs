//! Runner error types.

use std::time::Duration;

use speedtest_core::Target;
use thiserror::Error;

/// Why a single candidate attempt produced no result.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("failed to execute {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tool exited with {}: {stderr}", describe_exit(.code))]
    Exit { code: Option<i32>, stderr: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid JSON output: {0}")]
    Parse(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

/// A failed attempt against one candidate.
#[derive(Debug)]
pub struct AttemptFailure {
    pub target: Target,
    pub error: AttemptError,
}

/// Outcome of a run that produced no result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("all {} measurement candidates failed", .failures.len())]
    Exhausted { failures: Vec<AttemptFailure> },
}

pub type RunResult<T> = Result<T, RunError>;
