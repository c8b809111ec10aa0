//! Station endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use menlog_common::AppResult;
use menlog_db::entities::station;
use serde::Deserialize;

use super::SearchQuery;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Use station request.
#[derive(Debug, Deserialize)]
pub struct UseStationRequest {
    pub name: String,
    pub prefecture: Option<String>,
    pub line: Option<String>,
}

/// Popular stations query.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<u64>,
}

async fn use_station(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UseStationRequest>,
) -> AppResult<ApiResponse<station::Model>> {
    let station = state
        .station_service
        .use_station(&req.name, req.prefecture, req.line)
        .await?;
    Ok(ApiResponse::ok(station))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<station::Model>>> {
    let stations = state.station_service.search(&query.q, query.limit).await?;
    Ok(ApiResponse::ok(stations))
}

async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> AppResult<ApiResponse<Vec<station::Model>>> {
    let stations = state.station_service.popular(query.limit).await?;
    Ok(ApiResponse::ok(stations))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/use", post(use_station))
        .route("/search", get(search))
        .route("/popular", get(popular))
}
