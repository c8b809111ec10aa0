//! Feedback board endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::{CreateFeedbackInput, SteamResult};
use menlog_db::{entities::feedback, repositories::FeedbackSort};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

/// List feedback query.
#[derive(Debug, Deserialize)]
pub struct ListFeedbackQuery {
    #[serde(default)]
    pub sort: FeedbackSort,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

/// Request naming a single feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackIdRequest {
    pub feedback_id: String,
}

/// Steam request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamRequest {
    pub feedback_id: String,
    pub heat_level: i16,
}

/// Request naming several feedbacks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackIdsRequest {
    pub feedback_ids: Vec<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListFeedbackQuery>,
) -> AppResult<ApiResponse<Vec<feedback::Model>>> {
    let items = state
        .feedback_service
        .list(query.sort, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(items))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFeedbackInput>,
) -> AppResult<ApiResponse<feedback::Model>> {
    let created = state.feedback_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(created))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedbackIdRequest>,
) -> AppResult<ApiResponse<Success>> {
    state
        .feedback_service
        .delete(&user.id, &req.feedback_id)
        .await?;
    Ok(success())
}

async fn steam(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SteamRequest>,
) -> AppResult<ApiResponse<SteamResult>> {
    let result = state
        .feedback_service
        .steam(&user.id, &req.feedback_id, req.heat_level)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// The caller's steam level per feedback.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedbackIdsRequest>,
) -> AppResult<ApiResponse<HashMap<String, i16>>> {
    let steams = state
        .feedback_service
        .my_steams(&user.id, &req.feedback_ids)
        .await?;
    Ok(ApiResponse::ok(steams))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/steam", post(steam))
        .route("/mine", post(mine))
}
