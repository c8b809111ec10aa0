//! HTTP API layer for menlog.
//!
//! - **Endpoints**: JSON API under `/api`, plus `/healthz`
//! - **Extractors**: Authenticated user and identity claims
//! - **Middleware**: Bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// Slack on top of the upload limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router: `/api`, `/healthz` and authentication.
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/healthz", get(endpoints::health::healthz))
        .nest("/api", router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
