//! Ordered fallback across the endpoint preference list.
//!
//! Candidates are tried strictly one after another. The first attempt that
//! exits cleanly and yields parseable JSON wins; every other outcome is
//! logged and the next candidate is tried.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use speedtest_core::config::SpeedtestConfig;
use speedtest_core::{MeasurementResult, Target};

use crate::error::{AttemptError, AttemptFailure, RunError, RunResult};
use crate::ookla::parse_report;
use crate::tool::{CommandTool, SpeedtestTool};

pub struct Runner {
    tool: Arc<dyn SpeedtestTool>,
    servers: Vec<String>,
    timeout: Duration,
}

impl Runner {
    pub fn new(tool: Arc<dyn SpeedtestTool>, servers: Vec<String>, timeout: Duration) -> Self {
        Self {
            tool,
            servers,
            timeout,
        }
    }

    /// Build a runner that shells out to the configured speedtest binary.
    pub fn from_config(config: &SpeedtestConfig) -> Self {
        Self::new(
            Arc::new(CommandTool::from_config(config)),
            config.servers.clone(),
            config.timeout(),
        )
    }

    pub fn candidates(&self) -> Vec<Target> {
        Target::candidates(&self.servers)
    }

    /// Measure against the first candidate that succeeds.
    pub async fn run(&self) -> RunResult<MeasurementResult> {
        info!(
            preferred = %describe_preferences(&self.servers),
            "running speedtest"
        );

        let mut failures = Vec::new();

        for target in self.candidates() {
            match self.attempt(&target).await {
                Ok(result) => {
                    info!(candidate = %target, ?result, "speedtest succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    match &e {
                        AttemptError::Timeout(_) => warn!(
                            candidate = %target,
                            error = %e,
                            "server timed out, trying next candidate"
                        ),
                        AttemptError::Parse(_) => error!(
                            candidate = %target,
                            error = %e,
                            "JSON parse error, trying next candidate"
                        ),
                        AttemptError::Spawn { .. } | AttemptError::Exit { .. } => warn!(
                            candidate = %target,
                            error = %e,
                            "server failed, trying next candidate"
                        ),
                    }
                    failures.push(AttemptFailure { target, error: e });
                }
            }
        }

        error!(
            attempts = failures.len(),
            "all preferred servers failed or unavailable"
        );
        Err(RunError::Exhausted { failures })
    }

    async fn attempt(&self, target: &Target) -> Result<MeasurementResult, AttemptError> {
        let stdout = tokio::time::timeout(self.timeout, self.tool.measure(target))
            .await
            .map_err(|_| AttemptError::Timeout(self.timeout))??;
        Ok(parse_report(&stdout)?)
    }
}

fn describe_preferences(servers: &[String]) -> String {
    if servers.is_empty() {
        "auto-selected".to_string()
    } else {
        servers.join(", ")
    }
}
