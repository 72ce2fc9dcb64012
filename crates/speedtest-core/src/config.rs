//! exporter.toml configuration parser.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default scrape port.
pub const DEFAULT_PORT: u16 = 9110;

/// Default per-attempt timeout for the measurement tool.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub listen: ListenConfig,
    pub speedtest: SpeedtestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedtestConfig {
    /// Path or name of the measurement tool binary.
    pub binary: String,
    /// Preferred server ids, nearest first. Empty means auto-select.
    pub servers: Vec<String>,
    pub timeout_secs: u64,
    /// Arguments appended after the optional `-s <id>` target hint.
    pub args: Vec<String>,
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        Self {
            binary: "speedtest".to_string(),
            servers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            args: [
                "--accept-license",
                "--accept-gdpr",
                "-f",
                "json-pretty",
                "-u",
                "bps",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl SpeedtestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen.address, self.listen.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speedtest.binary.trim().is_empty() {
            return Err(ConfigError::Invalid("speedtest.binary is empty".into()));
        }
        if self.speedtest.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "speedtest.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.speedtest.servers.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "speedtest.servers contains a blank server id".into(),
            ));
        }
        Ok(())
    }
}
