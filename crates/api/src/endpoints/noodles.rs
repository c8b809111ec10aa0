//! Noodle endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::{CreateNoodleInput, NoodleView, UpdateNoodleInput};
use serde::Deserialize;

use super::{CursorQuery, DEFAULT_LIMIT};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateNoodleInput>,
) -> AppResult<ApiResponse<NoodleView>> {
    let noodle = state.noodle_service.create(&user.id, input).await?;
    let view = state.noodle_service.get(&noodle.id, Some(&user.id)).await?;
    Ok(ApiResponse::ok(view))
}

/// Update noodle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoodleRequest {
    pub noodle_id: String,
    #[serde(flatten)]
    pub input: UpdateNoodleInput,
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateNoodleRequest>,
) -> AppResult<ApiResponse<NoodleView>> {
    state
        .noodle_service
        .update(&user.id, &req.noodle_id, req.input)
        .await?;
    let view = state
        .noodle_service
        .get(&req.noodle_id, Some(&user.id))
        .await?;
    Ok(ApiResponse::ok(view))
}

/// Request naming a single noodle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoodleIdRequest {
    pub noodle_id: String,
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NoodleIdRequest>,
) -> AppResult<ApiResponse<Success>> {
    state.noodle_service.delete(&user.id, &req.noodle_id).await?;
    Ok(success())
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(noodle_id): Path<String>,
) -> AppResult<ApiResponse<NoodleView>> {
    let view = state.noodle_service.get(&noodle_id, viewer.id()).await?;
    Ok(ApiResponse::ok(view))
}

async fn timeline(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<NoodleView>>> {
    let noodles = state
        .noodle_service
        .timeline(
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.until_id.as_deref(),
            viewer.id(),
        )
        .await?;
    Ok(ApiResponse::ok(noodles))
}

async fn by_user(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<NoodleView>>> {
    let noodles = state
        .noodle_service
        .list_by_user(
            &user_id,
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.until_id.as_deref(),
            viewer.id(),
        )
        .await?;
    Ok(ApiResponse::ok(noodles))
}

async fn by_shop(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<NoodleView>>> {
    let noodles = state
        .noodle_service
        .list_by_shop(
            &shop_id,
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.until_id.as_deref(),
            viewer.id(),
        )
        .await?;
    Ok(ApiResponse::ok(noodles))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/timeline", get(timeline))
        .route("/user/{id}", get(by_user))
        .route("/shop/{id}", get(by_shop))
        .route("/{id}", get(show))
}
