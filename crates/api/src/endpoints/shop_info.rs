//! Shop information extraction from listing-site URLs.

use axum::{Json, Router, extract::State, routing::post};
use menlog_common::{ShopInfoError, fetch_shop_info};
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Extract request.
#[derive(Debug, Deserialize)]
pub struct ShopInfoRequest {
    pub url: String,
}

/// Extracted fields. Missing values serialize as `null`.
#[derive(Debug, Serialize)]
pub struct ShopInfoResponse {
    pub name: Option<String>,
    pub address: Option<String>,
    pub prefecture: Option<String>,
}

async fn extract(
    State(state): State<AppState>,
    Json(req): Json<ShopInfoRequest>,
) -> Result<Json<ShopInfoResponse>, ShopInfoError> {
    let info = match &state.shop_info_cache {
        Some(cache) => {
            cache
                .get_or_fetch(&req.url, &state.shop_info_settings)
                .await?
        }
        None => fetch_shop_info(&req.url, &state.shop_info_settings).await?,
    };

    Ok(Json(ShopInfoResponse {
        name: info.name,
        address: info.address,
        prefecture: info.prefecture,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(extract))
}
