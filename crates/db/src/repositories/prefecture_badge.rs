//! Prefecture badge repository.

use std::sync::Arc;

use crate::entities::{PrefectureBadge, prefecture_badge};
use menlog_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Prefecture badge repository for database operations.
#[derive(Clone)]
pub struct PrefectureBadgeRepository {
    db: Arc<DatabaseConnection>,
}

impl PrefectureBadgeRepository {
    /// Create a new prefecture badge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's badge for a prefecture.
    pub async fn find_by_user_and_prefecture(
        &self,
        user_id: &str,
        prefecture: &str,
    ) -> AppResult<Option<prefecture_badge::Model>> {
        PrefectureBadge::find()
            .filter(prefecture_badge::Column::UserId.eq(user_id))
            .filter(prefecture_badge::Column::Prefecture.eq(prefecture))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All badges a user holds.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<prefecture_badge::Model>> {
        PrefectureBadge::find()
            .filter(prefecture_badge::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new badge.
    pub async fn create(
        &self,
        model: prefecture_badge::ActiveModel,
    ) -> AppResult<prefecture_badge::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string()))
    }

    /// Update a badge.
    pub async fn update(
        &self,
        model: prefecture_badge::ActiveModel,
    ) -> AppResult<prefecture_badge::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::prefecture_badge::BadgeTier;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_user() {
        let now = Utc::now();
        let badges = vec![
            prefecture_badge::Model {
                id: "b1".to_string(),
                user_id: "user1".to_string(),
                prefecture: "東京都".to_string(),
                tier: BadgeTier::Gold,
                visit_count: 12,
                earned_at: now.into(),
                updated_at: now.into(),
            },
            prefecture_badge::Model {
                id: "b2".to_string(),
                user_id: "user1".to_string(),
                prefecture: "福岡県".to_string(),
                tier: BadgeTier::Bronze,
                visit_count: 1,
                earned_at: now.into(),
                updated_at: now.into(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([badges])
                .into_connection(),
        );

        let repo = PrefectureBadgeRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].tier, BadgeTier::Gold);
    }
}
