//! Scrape-driven publisher.
//!
//! Each scrape runs one measurement and, on success, replaces the live
//! snapshot wholesale. Cycles are serialized so that only one external
//! tool invocation is in flight and overlapping scrapes queue up.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use speedtest_runner::Runner;

use crate::error::PublishError;
use crate::snapshot::MetricSnapshot;

/// Source of Unix seconds for the per-run timestamp label.
pub type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

pub struct Publisher {
    runner: Runner,
    /// The live snapshot; swapped, never mutated in place.
    live: RwLock<Arc<MetricSnapshot>>,
    /// Held for the whole measure-then-swap cycle.
    cycle: Mutex<()>,
    clock: Clock,
}

impl Publisher {
    pub fn new(runner: Runner) -> Self {
        Self::with_clock(runner, Box::new(epoch_secs))
    }

    /// Use `clock` (Unix seconds) for the per-run timestamp label.
    pub fn with_clock(runner: Runner, clock: Clock) -> Self {
        Self {
            runner,
            live: RwLock::new(Arc::new(MetricSnapshot::empty())),
            cycle: Mutex::new(()),
            clock,
        }
    }

    /// The currently published snapshot, without measuring.
    pub async fn current(&self) -> Arc<MetricSnapshot> {
        self.live.read().await.clone()
    }

    /// Run one measurement cycle and return the snapshot live afterwards.
    ///
    /// When the run yields no result the previous snapshot stays published.
    pub async fn refresh(&self) -> Arc<MetricSnapshot> {
        let _cycle = self.cycle.lock().await;

        let result = match self.runner.run().await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "no results to update metrics with");
                return self.current().await;
            }
        };

        let timestamp = (self.clock)().to_string();
        match MetricSnapshot::build(&result, &timestamp) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.live.write().await = snapshot.clone();
                info!(%timestamp, "metrics snapshot published");
                snapshot
            }
            Err(e) => {
                error!(error = %e, "failed to build metrics snapshot");
                self.current().await
            }
        }
    }

    /// Handle one scrape: refresh, then encode the live snapshot.
    pub async fn scrape(&self) -> Result<String, PublishError> {
        self.refresh().await.encode()
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
