//! Comment like repository.

use std::sync::Arc;

use crate::entities::{CommentLike, comment_like};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QuerySelect,
};

/// Comment like repository for database operations.
#[derive(Clone)]
pub struct CommentLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentLikeRepository {
    /// Create a new comment like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and comment.
    pub async fn find_by_user_and_comment(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<comment_like::Model>> {
        CommentLike::find()
            .filter(comment_like::Column::UserId.eq(user_id))
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment like.
    pub async fn create(&self, model: comment_like::ActiveModel) -> AppResult<comment_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Delete a comment like. Returns false if the row was already gone.
    pub async fn delete(&self, model: comment_like::Model) -> AppResult<bool> {
        let result = model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Which of `comment_ids` the user has liked.
    pub async fn find_liked_comment_ids(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        CommentLike::find()
            .select_only()
            .column(comment_like::Column::CommentId)
            .filter(comment_like::Column::UserId.eq(user_id))
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
