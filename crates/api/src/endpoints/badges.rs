//! Prefecture badge endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::PrefectureStat;
use menlog_db::entities::prefecture_badge;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A user's badges, highest tier first.
async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<prefecture_badge::Model>>> {
    let badges = state.badge_service.list(&user_id).await?;
    Ok(ApiResponse::ok(badges))
}

/// Visit counts per prefecture with the tier each would earn.
async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<PrefectureStat>>> {
    let stats = state.badge_service.prefecture_stats(&user_id).await?;
    Ok(ApiResponse::ok(stats))
}

async fn recalculate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<prefecture_badge::Model>>> {
    let badges = state.badge_service.recalculate_all(&user.id).await?;
    Ok(ApiResponse::ok(badges))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{id}", get(by_user))
        .route("/stats/{id}", get(stats))
        .route("/recalculate", post(recalculate))
}
