//! "My best" endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_db::entities::my_best;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

/// Set pick request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMyBestRequest {
    pub category: String,
    pub noodle_id: String,
}

/// Remove pick request.
#[derive(Debug, Deserialize)]
pub struct RemoveMyBestRequest {
    pub category: String,
}

async fn set(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetMyBestRequest>,
) -> AppResult<ApiResponse<my_best::Model>> {
    let pick = state
        .my_best_service
        .set(&user.id, &req.category, &req.noodle_id)
        .await?;
    Ok(ApiResponse::ok(pick))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveMyBestRequest>,
) -> AppResult<ApiResponse<Success>> {
    state.my_best_service.remove(&user.id, &req.category).await?;
    Ok(success())
}

async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<my_best::Model>>> {
    let picks = state.my_best_service.list(&user_id).await?;
    Ok(ApiResponse::ok(picks))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set", post(set))
        .route("/remove", post(remove))
        .route("/user/{id}", get(by_user))
}
