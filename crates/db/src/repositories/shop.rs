//! Shop repository.

use std::sync::Arc;

use crate::entities::{Shop, shop};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, Func},
};

/// Shop repository for database operations.
#[derive(Clone)]
pub struct ShopRepository {
    db: Arc<DatabaseConnection>,
}

impl ShopRepository {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a shop by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<shop::Model>> {
        Shop::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a shop by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<shop::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shop: {id}")))
    }

    /// Find shops by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<shop::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Shop::find()
            .filter(shop::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a shop by its exact name and address.
    pub async fn find_by_name_and_address(
        &self,
        name: &str,
        address: &str,
    ) -> AppResult<Option<shop::Model>> {
        Shop::find()
            .filter(shop::Column::Name.eq(name))
            .filter(shop::Column::Address.eq(address))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new shop.
    pub async fn create(&self, model: shop::ActiveModel) -> AppResult<shop::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Case-insensitive name search.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<shop::Model>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        Shop::find()
            .filter(Expr::expr(Func::lower(Expr::col(shop::Column::Name))).like(pattern))
            .order_by_asc(shop::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List shops in a prefecture.
    pub async fn find_by_prefecture(
        &self,
        prefecture: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<shop::Model>> {
        Shop::find()
            .filter(shop::Column::Prefecture.eq(prefecture))
            .order_by_desc(shop::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Escape `%` and `_` for use inside a LIKE pattern.
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
