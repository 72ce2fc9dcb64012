//! Scrape handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error};

use crate::ApiState;

/// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::OK
}

/// GET /metrics (and any other path)
///
/// The cycle runs on its own task so a client that disconnects mid-measurement
/// does not cancel the speedtest or the snapshot swap.
pub async fn scrape(State(state): State<ApiState>) -> Response {
    debug!("scrape request received");
    let publisher = state.publisher.clone();

    match tokio::spawn(async move { publisher.scrape().await }).await {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [(CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "scrape task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
