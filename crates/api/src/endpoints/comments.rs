//! Comment endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::{CommentLikeToggleResult, CommentView};
use menlog_db::entities::comment;
use serde::Deserialize;

use super::likes::NoodleIdsRequest;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub noodle_id: String,
    pub content: String,
}

/// Request naming a single comment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .create(&user.id, &req.noodle_id, &req.content)
        .await?;
    Ok(ApiResponse::ok(comment))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<Success>> {
    state
        .comment_service
        .delete(&user.id, &req.comment_id)
        .await?;
    Ok(success())
}

async fn toggle_like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommentLikeToggleResult>> {
    let result = state
        .comment_like_service
        .toggle(&user.id, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(result))
}

async fn counts(
    State(state): State<AppState>,
    Json(req): Json<NoodleIdsRequest>,
) -> AppResult<ApiResponse<HashMap<String, i32>>> {
    let counts = state.comment_service.counts(&req.noodle_ids).await?;
    Ok(ApiResponse::ok(counts))
}

async fn by_noodle(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(noodle_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state
        .comment_service
        .list(&noodle_id, viewer.id())
        .await?;
    Ok(ApiResponse::ok(comments))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/toggle-like", post(toggle_like))
        .route("/counts", post(counts))
        .route("/noodle/{id}", get(by_noodle))
}
