//! The external measurement tool seam.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use speedtest_core::Target;
use speedtest_core::config::SpeedtestConfig;

use crate::error::AttemptError;

/// Something that can perform one measurement against a target.
///
/// Implementations return the tool's raw stdout on success. Timeouts are
/// enforced by the caller; dropping the returned future must stop the
/// measurement.
#[async_trait]
pub trait SpeedtestTool: Send + Sync {
    async fn measure(&self, target: &Target) -> Result<Vec<u8>, AttemptError>;
}

/// Runs the Ookla `speedtest` CLI as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandTool {
    binary: String,
    args: Vec<String>,
}

impl CommandTool {
    pub fn new(binary: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    pub fn from_config(config: &SpeedtestConfig) -> Self {
        Self::new(config.binary.clone(), config.args.clone())
    }

    fn command(&self, target: &Target) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(id) = target.server_id() {
            cmd.arg("-s").arg(id);
        }
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SpeedtestTool for CommandTool {
    async fn measure(&self, target: &Target) -> Result<Vec<u8>, AttemptError> {
        let mut cmd = self.command(target);
        debug!(%target, "running: {:?}", cmd);

        let output = cmd.output().await.map_err(|source| AttemptError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(AttemptError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
