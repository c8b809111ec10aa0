//! Station repository.

use std::sync::Arc;

use crate::entities::{Station, station};
use crate::repositories::shop::escape_like;
use chrono::Utc;
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Station repository for database operations.
#[derive(Clone)]
pub struct StationRepository {
    db: Arc<DatabaseConnection>,
}

impl StationRepository {
    /// Create a new station repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a station by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<station::Model>> {
        Station::find()
            .filter(station::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new station.
    pub async fn create(&self, model: station::ActiveModel) -> AppResult<station::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Record one more use of a station in a single UPDATE.
    ///
    /// Missing prefecture and line are filled from the arguments; existing
    /// values are kept.
    pub async fn record_use(
        &self,
        id: &str,
        prefecture: Option<String>,
        line: Option<String>,
    ) -> AppResult<station::Model> {
        let updated = Station::update_many()
            .col_expr(
                station::Column::UsageCount,
                Expr::col(station::Column::UsageCount).add(1),
            )
            .col_expr(
                station::Column::Prefecture,
                Expr::cust_with_values("COALESCE(prefecture, $1)", [prefecture]),
            )
            .col_expr(
                station::Column::Line,
                Expr::cust_with_values("COALESCE(line, $1)", [line]),
            )
            .col_expr(
                station::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(station::Column::Id.eq(id))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Station: {id}")))
    }

    /// Stations whose name starts with `prefix`, most used first.
    pub async fn search_prefix(&self, prefix: &str, limit: u64) -> AppResult<Vec<station::Model>> {
        Station::find()
            .filter(station::Column::Name.like(format!("{}%", escape_like(prefix))))
            .order_by_desc(station::Column::UsageCount)
            .order_by_asc(station::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most used stations.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<station::Model>> {
        Station::find()
            .order_by_desc(station::Column::UsageCount)
            .order_by_asc(station::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
