//! speedtest-exporter — Prometheus exporter for network speed.
//!
//! Every scrape runs the Ookla `speedtest` CLI against the preferred
//! servers (first usable one wins) and serves the result as gauges.
//!
//! # Usage
//!
//! ```text
//! speedtest-exporter --config /etc/speedtest-exporter.toml --server 31469 --server 30906
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use speedtest_core::ExporterConfig;
use speedtest_metrics::Publisher;
use speedtest_runner::Runner;

#[derive(Parser, Debug)]
#[command(
    name = "speedtest-exporter",
    about = "Prometheus exporter running a speedtest on every scrape",
    version
)]
struct Cli {
    /// Path to exporter.toml. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    address: Option<IpAddr>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Preferred server id; repeat to build an ordered list. Replaces the configured list.
    #[arg(short, long = "server", value_name = "ID")]
    servers: Vec<String>,

    /// Path to the speedtest binary.
    #[arg(long)]
    speedtest_bin: Option<String>,

    /// Per-server timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Load the config file (if any) and layer CLI overrides on top.
    fn resolve(&self) -> anyhow::Result<ExporterConfig> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExporterConfig::default(),
        };

        if let Some(address) = self.address {
            config.listen.address = address;
        }
        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if !self.servers.is_empty() {
            config.speedtest.servers = self.servers.clone();
        }
        if let Some(binary) = &self.speedtest_bin {
            config.speedtest.binary = binary.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.speedtest.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,speedtest=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve()?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    serve(config).await
}

async fn serve(config: ExporterConfig) -> anyhow::Result<()> {
    let runner = Runner::from_config(&config.speedtest);
    info!(
        binary = %config.speedtest.binary,
        servers = ?config.speedtest.servers,
        timeout_secs = config.speedtest.timeout_secs,
        "speedtest runner configured"
    );

    let publisher = Arc::new(Publisher::new(runner));
    let router = speedtest_api::build_router(publisher);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "exporter listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("exporter stopped");
    Ok(())
}
