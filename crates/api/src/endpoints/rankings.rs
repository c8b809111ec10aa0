//! Ranking endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use menlog_common::AppResult;
use menlog_core::{RankingEntries, RankingPeriod, RankingView};
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Ranking query.
#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    /// `all` (default), `week` or `month`
    pub period: Option<String>,
    /// Default 50, max 100
    pub limit: Option<u64>,
}

async fn ranking(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Query(query): Query<RankingQuery>,
) -> AppResult<ApiResponse<RankingEntries>> {
    let view: RankingView = view.parse()?;
    let period = query
        .period
        .as_deref()
        .map(str::parse::<RankingPeriod>)
        .transpose()?
        .unwrap_or_default();

    let entries = state
        .ranking_service
        .ranking(view, period, query.limit)
        .await?;
    Ok(ApiResponse::ok(entries))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{view}", get(ranking))
}
