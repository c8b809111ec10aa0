//! Feedback steam repository.

use std::sync::Arc;

use crate::entities::{FeedbackSteam, feedback_steam};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    sea_query::Expr,
};

/// Feedback steam repository for database operations.
#[derive(Clone)]
pub struct FeedbackSteamRepository {
    db: Arc<DatabaseConnection>,
}

impl FeedbackSteamRepository {
    /// Create a new feedback steam repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's steam on a feedback.
    pub async fn find_by_user_and_feedback(
        &self,
        user_id: &str,
        feedback_id: &str,
    ) -> AppResult<Option<feedback_steam::Model>> {
        FeedbackSteam::find()
            .filter(feedback_steam::Column::UserId.eq(user_id))
            .filter(feedback_steam::Column::FeedbackId.eq(feedback_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's steams on any of `feedback_ids`.
    pub async fn find_by_user_and_feedbacks(
        &self,
        user_id: &str,
        feedback_ids: &[String],
    ) -> AppResult<Vec<feedback_steam::Model>> {
        if feedback_ids.is_empty() {
            return Ok(vec![]);
        }

        FeedbackSteam::find()
            .filter(feedback_steam::Column::UserId.eq(user_id))
            .filter(feedback_steam::Column::FeedbackId.is_in(feedback_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new steam.
    pub async fn create(
        &self,
        model: feedback_steam::ActiveModel,
    ) -> AppResult<feedback_steam::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Change a steam's heat level, but only while it is still at `from`.
    /// Returns false if the row was changed or removed in the meantime.
    pub async fn update_level(&self, steam_id: &str, from: i16, to: i16) -> AppResult<bool> {
        let result = FeedbackSteam::update_many()
            .col_expr(feedback_steam::Column::HeatLevel, Expr::value(to))
            .filter(feedback_steam::Column::Id.eq(steam_id))
            .filter(feedback_steam::Column::HeatLevel.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Delete a steam. Returns false if the row was already gone.
    pub async fn delete(&self, model: feedback_steam::Model) -> AppResult<bool> {
        let result = model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
