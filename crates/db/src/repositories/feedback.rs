//! Feedback repository.

use std::sync::Arc;

use crate::entities::{Feedback, feedback};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use serde::Deserialize;

/// Feedback listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSort {
    /// Most steamed first
    Hot,
    /// Newest first
    #[default]
    New,
}

/// Feedback repository for database operations.
#[derive(Clone)]
pub struct FeedbackRepository {
    db: Arc<DatabaseConnection>,
}

impl FeedbackRepository {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find feedback by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<feedback::Model>> {
        Feedback::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find feedback by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<feedback::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Feedback: {id}")))
    }

    /// Create new feedback.
    pub async fn create(&self, model: feedback::ActiveModel) -> AppResult<feedback::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete feedback. Steam reactions cascade.
    pub async fn delete(&self, model: feedback::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List feedback.
    pub async fn list(
        &self,
        sort: FeedbackSort,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<feedback::Model>> {
        let query = match sort {
            FeedbackSort::Hot => Feedback::find()
                .order_by_desc(feedback::Column::SteamCount)
                .order_by_desc(feedback::Column::Id),
            FeedbackSort::New => Feedback::find().order_by_desc(feedback::Column::Id),
        };

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Adjust the steam count atomically and return the new value.
    pub async fn adjust_steam_count(&self, feedback_id: &str, delta: i32) -> AppResult<i32> {
        let updated = Feedback::update_many()
            .col_expr(
                feedback::Column::SteamCount,
                Expr::cust_with_values("GREATEST(steam_count + $1, 0)", [delta]),
            )
            .filter(feedback::Column::Id.eq(feedback_id))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        updated
            .first()
            .map(|f| f.steam_count)
            .ok_or_else(|| AppError::NotFound(format!("Feedback: {feedback_id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::feedback::FeedbackCategory;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_feedback(id: &str, steam_count: i32) -> feedback::Model {
        feedback::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            category: FeedbackCategory::Feature,
            message: "ダークモードがほしい".to_string(),
            heat_level: 2,
            steam_count,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_sort_deserialize() {
        let hot: FeedbackSort = serde_json::from_str("\"hot\"").unwrap();
        assert_eq!(hot, FeedbackSort::Hot);
        assert_eq!(FeedbackSort::default(), FeedbackSort::New);
    }

    #[tokio::test]
    async fn test_list_hot() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_feedback("f2", 9),
                    create_test_feedback("f1", 1),
                ]])
                .into_connection(),
        );

        let repo = FeedbackRepository::new(db);
        let result = repo.list(FeedbackSort::Hot, 20, 0).await.unwrap();

        assert_eq!(result[0].steam_count, 9);
    }

    #[tokio::test]
    async fn test_adjust_steam_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_feedback("f1", 4)]])
                .into_connection(),
        );

        let repo = FeedbackRepository::new(db);
        let count = repo.adjust_steam_count("f1", -2).await.unwrap();

        assert_eq!(count, 4);
    }
}
