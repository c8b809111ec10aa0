//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{ "data": ... }`.
///
/// Errors are rendered by `AppError` as `{ "error": { "code", "message" } }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Body for actions that return nothing but success.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

/// `{ "data": { "success": true } }`.
#[must_use]
pub const fn success() -> ApiResponse<Success> {
    ApiResponse::ok(Success { success: true })
}

/// Body carrying a single count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}
