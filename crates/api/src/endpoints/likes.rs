//! Like endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::{LikeToggleResult, NoodleView};
use serde::Deserialize;

use super::{DEFAULT_LIMIT, OffsetQuery, noodles::NoodleIdRequest};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request naming several noodles.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoodleIdsRequest {
    pub noodle_ids: Vec<String>,
}

async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NoodleIdRequest>,
) -> AppResult<ApiResponse<LikeToggleResult>> {
    let result = state.like_service.toggle(&user.id, &req.noodle_id).await?;
    Ok(ApiResponse::ok(result))
}

async fn counts(
    State(state): State<AppState>,
    Json(req): Json<NoodleIdsRequest>,
) -> AppResult<ApiResponse<HashMap<String, i32>>> {
    let counts = state.like_service.counts(&req.noodle_ids).await?;
    Ok(ApiResponse::ok(counts))
}

/// Which of the given noodles the caller liked.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NoodleIdsRequest>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let ids = state
        .like_service
        .liked_ids(&user.id, &req.noodle_ids)
        .await?;
    Ok(ApiResponse::ok(ids))
}

/// Noodles the caller liked, most recent first.
async fn liked_noodles(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<NoodleView>>> {
    let noodles = state
        .like_service
        .liked_noodles(&user.id, query.limit.unwrap_or(DEFAULT_LIMIT), query.offset)
        .await?;
    let views = state
        .noodle_service
        .pack_many(noodles, Some(&user.id))
        .await?;
    Ok(ApiResponse::ok(views))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/counts", post(counts))
        .route("/mine", post(mine))
        .route("/noodles", get(liked_noodles))
}
