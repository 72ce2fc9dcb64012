//! Normalization of the Ookla speedtest CLI JSON output.
//!
//! Every object and field in the document is optional. Missing numbers
//! become 0 and missing descriptors become `"unknown"`.

use serde::Deserialize;
use serde_json::Value;

use speedtest_core::{ClientInfo, MeasurementResult, ResultInfo, ServerInfo, UNKNOWN};

/// Subset of the tool's JSON document that the exporter consumes.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Report {
    download: Option<Transfer>,
    upload: Option<Transfer>,
    ping: Option<Ping>,
    packet_loss: Option<f64>,
    timestamp: Option<Value>,
    server: Option<Server>,
    interface: Option<Interface>,
    isp: Option<Value>,
    result: Option<ResultLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Transfer {
    /// Bytes per second.
    bandwidth: Option<f64>,
    bytes: Option<f64>,
    /// Milliseconds.
    elapsed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Ping {
    jitter: Option<f64>,
    latency: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Server {
    id: Option<Value>,
    name: Option<Value>,
    location: Option<Value>,
    country: Option<Value>,
    ip: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Interface {
    external_ip: Option<Value>,
    is_vpn: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultLink {
    url: Option<Value>,
}

/// Parse the tool's stdout into a canonical [`MeasurementResult`].
pub fn parse_report(stdout: &[u8]) -> Result<MeasurementResult, serde_json::Error> {
    let report: Report = serde_json::from_slice(stdout)?;
    Ok(normalize(report))
}

fn normalize(report: Report) -> MeasurementResult {
    let download = report.download.unwrap_or_default();
    let upload = report.upload.unwrap_or_default();
    let ping = report.ping.unwrap_or_default();
    let server = report.server.unwrap_or_default();
    let interface = report.interface.unwrap_or_default();
    let link = report.result.unwrap_or_default();

    MeasurementResult {
        download_bps: number(download.bandwidth) * 8.0,
        upload_bps: number(upload.bandwidth) * 8.0,
        jitter_ms: number(ping.jitter),
        latency_ms: number(ping.latency),
        packet_loss_pct: number(report.packet_loss),
        bytes_sent: number(upload.bytes),
        bytes_received: number(download.bytes),
        elapsed_secs: (number(upload.elapsed) + number(download.elapsed)) / 1000.0,
        timestamp: scalar(report.timestamp.as_ref(), ""),
        server: ServerInfo {
            id: descriptor(server.id.as_ref()),
            name: descriptor(server.name.as_ref()),
            location: descriptor(server.location.as_ref()),
            country: descriptor(server.country.as_ref()),
            ip: descriptor(server.ip.as_ref()),
        },
        client: ClientInfo {
            ip: descriptor(interface.external_ip.as_ref()),
            vpn: descriptor(interface.is_vpn.as_ref()),
            isp: descriptor(report.isp.as_ref()),
        },
        result: ResultInfo {
            url: descriptor(link.url.as_ref()),
        },
    }
}

fn number(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).max(0.0)
}

fn descriptor(value: Option<&Value>) -> String {
    scalar(value, UNKNOWN)
}

/// Render a JSON scalar as a label string; `null` and absence use `fallback`.
fn scalar(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
