//! End-to-end scrape regression tests.
//!
//! Drives the full router → publisher → runner → subprocess pipeline
//! against a fake `speedtest` shell script.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use speedtest_api::build_router;
use speedtest_core::config::SpeedtestConfig;
use speedtest_metrics::Publisher;
use speedtest_runner::Runner;

const FAKE_SPEEDTEST: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
if [ "$1" = "-s" ]; then target="$2"; else target="auto"; fi
if [ "$target" = "slow" ]; then sleep 1; fi
case "$target" in
  hang) exec sleep 5 ;;
  fail) echo "connection refused" >&2; exit 2 ;;
  garbage) echo "this is not json" ;;
  *) cat <<'JSON'
{
  "timestamp": "2025-05-01T10:00:00Z",
  "ping": {"jitter": 0.8, "latency": 9.5},
  "download": {"bandwidth": 12500000, "bytes": 120000000, "elapsed": 10000},
  "upload": {"bandwidth": 1250000, "bytes": 12000000, "elapsed": 9000},
  "isp": "Example Telecom",
  "interface": {"externalIp": "203.0.113.7", "isVpn": false},
  "server": {"id": 30906, "name": "Deutsche Telekom", "location": "Duesseldorf", "country": "Germany", "ip": "198.51.100.20"},
  "result": {"url": "https://www.speedtest.net/result/c/xyz"}
}
JSON
  ;;
esac
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    script: PathBuf,
    log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("speedtest");
        std::fs::write(&script, FAKE_SPEEDTEST).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let log = dir.path().join("calls.log");
        Self {
            _dir: dir,
            script,
            log,
        }
    }

    fn router(&self, servers: &[&str]) -> axum::Router {
        build_router(self.publisher(servers, 1))
    }

    fn publisher(&self, servers: &[&str], timeout_secs: u64) -> Arc<Publisher> {
        let config = SpeedtestConfig {
            binary: self.script.to_string_lossy().to_string(),
            servers: servers.iter().map(|s| s.to_string()).collect(),
            timeout_secs,
            args: vec!["-f".to_string(), "json".to_string()],
        };
        Arc::new(Publisher::new(Runner::from_config(&config)))
    }

    fn calls(&self) -> Vec<String> {
        read_lines(&self.log)
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

async fn scrape(router: axum::Router) -> (StatusCode, String) {
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn value(text: &str, metric: &str) -> f64 {
    let prefix = format!("{metric}{{");
    let line = text
        .lines()
        .find(|line| line.starts_with(&prefix))
        .unwrap_or_else(|| panic!("{metric} missing from:\n{text}"));
    line.rsplit_once(' ').unwrap().1.parse().unwrap()
}

#[tokio::test]
async fn timed_out_server_falls_back_to_next() {
    let fixture = Fixture::new();
    let (status, text) = scrape(fixture.router(&["hang", "ok"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value(&text, "speedtest_download"), 100_000_000.0);
    assert_eq!(value(&text, "speedtest_upload"), 10_000_000.0);
    assert_eq!(value(&text, "speedtest_elapsed_time"), 19.0);
    assert_eq!(value(&text, "speedtest_bytes_sent"), 12_000_000.0);
    assert_eq!(value(&text, "speedtest_bytes_received"), 120_000_000.0);
    assert_eq!(value(&text, "speedtest_server_info"), 1.0);
    assert!(text.contains("id=\"30906\""));
    assert!(text.contains("url=\"https://www.speedtest.net/result/c/xyz\""));
    assert_eq!(fixture.calls(), vec!["-s hang -f json", "-s ok -f json"]);
}

#[tokio::test]
async fn failures_and_bad_output_fall_back_in_order() {
    let fixture = Fixture::new();
    let (status, text) = scrape(fixture.router(&["fail", "garbage", "ok", "unused"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value(&text, "speedtest_ping"), 9.5);
    assert_eq!(
        fixture.calls(),
        vec!["-s fail -f json", "-s garbage -f json", "-s ok -f json"]
    );
}

#[tokio::test]
async fn empty_preference_list_auto_selects_once() {
    let fixture = Fixture::new();
    let (status, text) = scrape(fixture.router(&[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value(&text, "speedtest_jitter"), 0.8);
    assert_eq!(fixture.calls(), vec!["-f json"]);
}

#[tokio::test]
async fn exhausted_candidates_still_answer_scrape() {
    let fixture = Fixture::new();
    let (status, text) = scrape(fixture.router(&["fail", "garbage"])).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!text.contains("speedtest_download"));
    assert_eq!(fixture.calls().len(), 2);
}

#[tokio::test]
async fn client_disconnect_does_not_cancel_measurement() {
    let fixture = Fixture::new();
    let publisher = fixture.publisher(&["slow"], 5);
    let router = build_router(publisher.clone());

    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let gave_up = tokio::time::timeout(Duration::from_millis(200), router.oneshot(req)).await;
    assert!(gave_up.is_err(), "scrape should still be measuring");

    // The spawned cycle keeps running and publishes after the script finishes.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let snapshot = publisher.current().await;
    assert!(snapshot.timestamp().is_some(), "measurement was cancelled");
    assert_eq!(fixture.calls(), vec!["-s slow -f json"]);

    let text = snapshot.encode().unwrap();
    assert_eq!(value(&text, "speedtest_download"), 100_000_000.0);
}
