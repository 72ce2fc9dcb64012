//! Publisher error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to build metric snapshot: {0}")]
    Build(#[source] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),

    #[error("encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
