//! Shop endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_core::CreateShopInput;
use menlog_db::entities::shop;

use super::{DEFAULT_LIMIT, OffsetQuery, SearchQuery};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Register a shop, or return the existing one with the same name and address.
async fn create(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateShopInput>,
) -> AppResult<ApiResponse<shop::Model>> {
    let shop = state.shop_service.create(input).await?;
    Ok(ApiResponse::ok(shop))
}

async fn show(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
) -> AppResult<ApiResponse<shop::Model>> {
    let shop = state.shop_service.get(&shop_id).await?;
    Ok(ApiResponse::ok(shop))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<shop::Model>>> {
    let shops = state
        .shop_service
        .search(&query.q, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ApiResponse::ok(shops))
}

async fn by_prefecture(
    State(state): State<AppState>,
    Path(prefecture): Path<String>,
    Query(query): Query<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<shop::Model>>> {
    let shops = state
        .shop_service
        .list_by_prefecture(
            &prefecture,
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.offset,
        )
        .await?;
    Ok(ApiResponse::ok(shops))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/search", get(search))
        .route("/prefecture/{prefecture}", get(by_prefecture))
        .route("/{id}", get(show))
}
