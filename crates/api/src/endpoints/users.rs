//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::{UpdateProfileInput, UserSummary};
use menlog_db::entities::user;
use serde::Deserialize;

use super::{DEFAULT_LIMIT, OffsetQuery};
use crate::{
    extractors::{AuthUser, Identity},
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

/// Store the signed-in identity as a local user.
async fn store(
    Identity(claims): Identity,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.store(&claims).await?;
    Ok(ApiResponse::ok(user))
}

/// The signed-in user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}

/// Active users.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state
        .user_service
        .list(query.limit.unwrap_or(DEFAULT_LIMIT), query.offset)
        .await?;
    Ok(ApiResponse::ok(users.iter().map(UserSummary::from).collect()))
}

/// A user's public profile.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserSummary>> {
    let user = state.user_service.get(&user_id).await?;
    Ok(ApiResponse::ok(UserSummary::from(&user)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated))
}

/// Set theme request.
#[derive(Debug, Deserialize)]
pub struct SetThemeRequest {
    pub level: i16,
}

async fn set_theme(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetThemeRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .user_service
        .set_theme_level(&user.id, req.level)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Soft-delete the signed-in user.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Success>> {
    state.user_service.delete(&user.id).await?;
    Ok(success())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/store", post(store))
        .route("/me", get(me))
        .route("/update", post(update))
        .route("/theme", post(set_theme))
        .route("/delete", post(delete))
        .route("/{id}", get(show))
}
