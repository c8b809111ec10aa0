//! API endpoints.

mod badges;
mod comments;
mod feedback;
pub mod health;
mod images;
mod likes;
mod my_best;
mod noodles;
mod notifications;
mod rankings;
mod shop_info;
mod shops;
mod stations;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Cursor pagination (`until_id`, newest first).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorQuery {
    pub limit: Option<u64>,
    pub until_id: Option<String>,
}

/// Offset pagination.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetQuery {
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

/// Free-text search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u64>,
}

/// Default page size.
const DEFAULT_LIMIT: u64 = 20;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/shops", shops::router())
        .nest("/noodles", noodles::router())
        .nest("/likes", likes::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/badges", badges::router())
        .nest("/rankings", rankings::router())
        .nest("/my-best", my_best::router())
        .nest("/feedback", feedback::router())
        .nest("/stations", stations::router())
        .nest("/images", images::router())
        .nest("/shop-info", shop_info::router())
}
