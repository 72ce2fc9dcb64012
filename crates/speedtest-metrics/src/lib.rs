//! speedtest-metrics — scrape-driven Prometheus snapshots.
//!
//! # Architecture
//!
//! ```text
//! Publisher::scrape()
//!   ├── Runner::run()             ← one fresh measurement
//!   ├── MetricSnapshot::build()   ← new registry for that run
//!   ├── swap live snapshot
//!   └── MetricSnapshot::encode()  → text/plain for /metrics
//! ```

pub mod error;
pub mod publisher;
pub mod snapshot;

pub use error::PublishError;
pub use publisher::Publisher;
pub use snapshot::MetricSnapshot;
