//! Immutable metric snapshots.
//!
//! A snapshot owns its own Prometheus registry holding exactly one run's
//! label set. Publishing a run means building a new snapshot and swapping
//! it in, so readers never see a half-cleared registry.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use speedtest_core::MeasurementResult;

use crate::error::PublishError;

/// Per-run gauges: (name, help, value accessor). Labelled by `timestamp`.
const RUN_GAUGES: [(&str, &str, fn(&MeasurementResult) -> f64); 8] = [
    ("speedtest_download", "Download speed in bits per second", |r| r.download_bps),
    ("speedtest_upload", "Upload speed in bits per second", |r| r.upload_bps),
    ("speedtest_jitter", "Jitter time in milliseconds", |r| r.jitter_ms),
    ("speedtest_ping", "Ping time in milliseconds", |r| r.latency_ms),
    ("speedtest_packetloss", "Packet loss in percent", |r| r.packet_loss_pct),
    ("speedtest_bytes_sent", "Bytes sent during the test", |r| r.bytes_sent),
    ("speedtest_bytes_received", "Bytes received during the test", |r| r.bytes_received),
    ("speedtest_elapsed_time", "Elapsed time for the test in seconds", |r| r.elapsed_secs),
];

/// The complete exported metric set at one point in time.
pub struct MetricSnapshot {
    registry: Registry,
    timestamp: Option<String>,
}

impl MetricSnapshot {
    /// A snapshot with no samples, live until the first successful run.
    pub fn empty() -> Self {
        Self {
            registry: Registry::new(),
            timestamp: None,
        }
    }

    /// Build the snapshot for one successful run labelled with `timestamp`.
    pub fn build(result: &MeasurementResult, timestamp: &str) -> Result<Self, PublishError> {
        let registry = Registry::new();

        for (name, help, value) in RUN_GAUGES {
            let gauge = register(&registry, name, help, &["timestamp"])?;
            gauge.with_label_values(&[timestamp]).set(value(result));
        }

        let server = &result.server;
        register(
            &registry,
            "speedtest_server_info",
            "Server information",
            &["timestamp", "id", "name", "location", "country", "ip"],
        )?
        .with_label_values(&[
            timestamp,
            server.id.as_str(),
            server.name.as_str(),
            server.location.as_str(),
            server.country.as_str(),
            server.ip.as_str(),
        ])
        .set(1.0);

        let client = &result.client;
        register(
            &registry,
            "speedtest_client_info",
            "Client information",
            &["timestamp", "ip", "vpn", "isp"],
        )?
        .with_label_values(&[
            timestamp,
            client.ip.as_str(),
            client.vpn.as_str(),
            client.isp.as_str(),
        ])
        .set(1.0);

        register(
            &registry,
            "speedtest_result_info",
            "Result information",
            &["timestamp", "url"],
        )?
        .with_label_values(&[timestamp, result.result.url.as_str()])
        .set(1.0);

        Ok(Self {
            registry,
            timestamp: Some(timestamp.to_string()),
        })
    }

    /// Timestamp label of the run this snapshot holds, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Encode in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, PublishError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(PublishError::Encode)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn register(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, PublishError> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels).map_err(PublishError::Build)?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(PublishError::Build)?;
    Ok(gauge)
}
