pub mod config;
pub mod types;

pub use config::{ConfigError, ExporterConfig};
pub use types::*;
