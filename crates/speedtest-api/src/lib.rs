//! speedtest-api — HTTP scrape endpoint.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/favicon.ico` | Empty response, no measurement |
//! | any | any other path | Run one measurement, return Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use speedtest_metrics::Publisher;

/// Shared state for scrape handlers.
#[derive(Clone)]
pub struct ApiState {
    pub publisher: Arc<Publisher>,
}

/// Build the scrape router.
pub fn build_router(publisher: Arc<Publisher>) -> Router {
    let state = ApiState { publisher };

    Router::new()
        .route("/favicon.ico", get(handlers::favicon))
        .fallback(handlers::scrape)
        .with_state(state)
}
