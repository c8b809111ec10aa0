//! My-best repository.

use std::sync::Arc;

use crate::entities::{MyBest, my_best};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// My-best repository for database operations.
#[derive(Clone)]
pub struct MyBestRepository {
    db: Arc<DatabaseConnection>,
}

impl MyBestRepository {
    /// Create a new my-best repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's pick for a category.
    pub async fn find_by_user_and_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> AppResult<Option<my_best::Model>> {
        MyBest::find()
            .filter(my_best::Column::UserId.eq(user_id))
            .filter(my_best::Column::Category.eq(category))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All of a user's picks, by category.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<my_best::Model>> {
        MyBest::find()
            .filter(my_best::Column::UserId.eq(user_id))
            .order_by_asc(my_best::Column::Category)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new pick.
    pub async fn create(&self, model: my_best::ActiveModel) -> AppResult<my_best::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Update a pick.
    pub async fn update(&self, model: my_best::ActiveModel) -> AppResult<my_best::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user's pick for a category. Returns whether a row was removed.
    pub async fn delete_by_user_and_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> AppResult<bool> {
        let result = MyBest::delete_many()
            .filter(my_best::Column::UserId.eq(user_id))
            .filter(my_best::Column::Category.eq(category))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
