//! Shared types used across speedtest exporter crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for descriptor fields the measurement tool did not report.
pub const UNKNOWN: &str = "unknown";

/// One entry of the endpoint preference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Let the measurement tool pick a server on its own.
    Auto,
    /// A specific measurement server id.
    Server(String),
}

impl Target {
    /// Expand a preference list into the ordered candidates for one run.
    ///
    /// An empty list yields a single [`Target::Auto`] candidate.
    pub fn candidates(servers: &[String]) -> Vec<Target> {
        if servers.is_empty() {
            return vec![Target::Auto];
        }
        servers.iter().cloned().map(Target::Server).collect()
    }

    /// The server id passed to the tool, if any.
    pub fn server_id(&self) -> Option<&str> {
        match self {
            Target::Auto => None,
            Target::Server(id) => Some(id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Auto => f.write_str("auto"),
            Target::Server(id) => f.write_str(id),
        }
    }
}

/// Measurement server that served a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub country: String,
    pub ip: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            id: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
            location: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            ip: UNKNOWN.to_string(),
        }
    }
}

/// The measuring host as seen by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip: String,
    pub vpn: String,
    pub isp: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            ip: UNKNOWN.to_string(),
            vpn: UNKNOWN.to_string(),
            isp: UNKNOWN.to_string(),
        }
    }
}

/// Where the run's result can be looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub url: String,
}

impl Default for ResultInfo {
    fn default() -> Self {
        Self {
            url: UNKNOWN.to_string(),
        }
    }
}

/// Canonical record of one successful measurement.
///
/// Rates are in bits per second, latency and jitter in milliseconds,
/// packet loss in percent and elapsed time in seconds. All numeric
/// fields are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub download_bps: f64,
    pub upload_bps: f64,
    pub jitter_ms: f64,
    pub latency_ms: f64,
    pub packet_loss_pct: f64,
    pub bytes_sent: f64,
    pub bytes_received: f64,
    pub elapsed_secs: f64,
    /// Timestamp string as reported by the tool, kept verbatim.
    pub timestamp: String,
    pub server: ServerInfo,
    pub client: ClientInfo,
    pub result: ResultInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_preference_list_is_single_auto_candidate() {
        assert_eq!(Target::candidates(&[]), vec![Target::Auto]);
    }

    #[test]
    fn candidates_keep_list_order() {
        let servers = vec!["31469".to_string(), "30906".to_string()];
        assert_eq!(
            Target::candidates(&servers),
            vec![
                Target::Server("31469".to_string()),
                Target::Server("30906".to_string()),
            ]
        );
    }

    #[test]
    fn target_display() {
        assert_eq!(Target::Auto.to_string(), "auto");
        assert_eq!(Target::Server("48042".into()).to_string(), "48042");
        assert_eq!(Target::Auto.server_id(), None);
    }

    #[test]
    fn descriptors_default_to_unknown() {
        let result = MeasurementResult::default();
        assert_eq!(result.download_bps, 0.0);
        assert_eq!(result.server.country, UNKNOWN);
        assert_eq!(result.client.vpn, UNKNOWN);
        assert_eq!(result.result.url, UNKNOWN);
    }
}
