//! Noodle like repository.

use std::sync::Arc;

use crate::entities::{Like, like};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and noodle.
    pub async fn find_by_user_and_noodle(
        &self,
        user_id: &str,
        noodle_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::NoodleId.eq(noodle_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new like.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Delete a like. Returns false if the row was already gone.
    pub async fn delete(&self, model: like::Model) -> AppResult<bool> {
        let result = model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Which of `noodle_ids` the user has liked.
    pub async fn find_liked_noodle_ids(
        &self,
        user_id: &str,
        noodle_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if noodle_ids.is_empty() {
            return Ok(vec![]);
        }

        Like::find()
            .select_only()
            .column(like::Column::NoodleId)
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::NoodleId.is_in(noodle_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Likes given by a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .order_by_desc(like::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All likes created at or after `since` (all time when `None`).
    pub async fn find_created_since(
        &self,
        since: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<like::Model>> {
        let mut query = Like::find();

        if let Some(since) = since {
            query = query.filter(like::Column::CreatedAt.gte(since));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
