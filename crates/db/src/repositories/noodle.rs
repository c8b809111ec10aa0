//! Noodle repository.

use std::sync::Arc;

use crate::entities::{Noodle, User, noodle, user};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Query, SimpleExpr},
};

/// Noodle repository for database operations.
#[derive(Clone)]
pub struct NoodleRepository {
    db: Arc<DatabaseConnection>,
}

/// `noodle.user_id IN (SELECT id FROM user WHERE deleted_at IS NULL)`
fn by_active_author() -> SimpleExpr {
    noodle::Column::UserId.in_subquery(
        Query::select()
            .column(user::Column::Id)
            .from(User)
            .and_where(user::Column::DeletedAt.is_null())
            .to_owned(),
    )
}

impl NoodleRepository {
    /// Create a new noodle repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a noodle by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<noodle::Model>> {
        Noodle::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a noodle by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<noodle::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NoodleNotFound(id.to_string()))
    }

    /// Find noodles by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<noodle::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Noodle::find()
            .filter(noodle::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new noodle.
    pub async fn create(&self, model: noodle::ActiveModel) -> AppResult<noodle::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a noodle.
    pub async fn update(&self, model: noodle::ActiveModel) -> AppResult<noodle::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a noodle. Likes, comments, my-best rows and notifications
    /// go with it through foreign key cascades.
    pub async fn delete(&self, model: noodle::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Global timeline (paginated, newest first).
    pub async fn find_timeline(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<noodle::Model>> {
        let mut query = Noodle::find()
            .filter(by_active_author())
            .order_by_desc(noodle::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(noodle::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Noodles posted by a user (paginated, newest first).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<noodle::Model>> {
        let mut query = Noodle::find()
            .filter(noodle::Column::UserId.eq(user_id))
            .filter(by_active_author())
            .order_by_desc(noodle::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(noodle::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Noodles eaten at a shop (paginated, newest first).
    pub async fn find_by_shop(
        &self,
        shop_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<noodle::Model>> {
        let mut query = Noodle::find()
            .filter(noodle::Column::ShopId.eq(shop_id))
            .filter(by_active_author())
            .order_by_desc(noodle::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(noodle::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Distinct shop IDs a user has posted from.
    pub async fn find_distinct_shop_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Noodle::find()
            .select_only()
            .column(noodle::Column::ShopId)
            .distinct()
            .filter(noodle::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All noodles created at or after `since` (all time when `None`).
    pub async fn find_created_since(
        &self,
        since: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<noodle::Model>> {
        let mut query = Noodle::find();

        if let Some(since) = since {
            query = query.filter(noodle::Column::CreatedAt.gte(since));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Adjust the like count atomically and return the new value.
    pub async fn adjust_like_count(&self, noodle_id: &str, delta: i32) -> AppResult<i32> {
        let updated = Noodle::update_many()
            .col_expr(
                noodle::Column::LikeCount,
                Expr::cust_with_values("GREATEST(like_count + $1, 0)", [delta]),
            )
            .filter(noodle::Column::Id.eq(noodle_id))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        updated
            .first()
            .map(|n| n.like_count)
            .ok_or_else(|| AppError::NoodleNotFound(noodle_id.to_string()))
    }

    /// Adjust the comment count atomically and return the new value.
    pub async fn adjust_comment_count(&self, noodle_id: &str, delta: i32) -> AppResult<i32> {
        let updated = Noodle::update_many()
            .col_expr(
                noodle::Column::CommentCount,
                Expr::cust_with_values("GREATEST(comment_count + $1, 0)", [delta]),
            )
            .filter(noodle::Column::Id.eq(noodle_id))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        updated
            .first()
            .map(|n| n.comment_count)
            .ok_or_else(|| AppError::NoodleNotFound(noodle_id.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_noodle(id: &str, user_id: &str, like_count: i32) -> noodle::Model {
        noodle::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            shop_id: "shop1".to_string(),
            ramen_name: "特製醤油らーめん".to_string(),
            genres: serde_json::json!(["醤油"]),
            visit_date: None,
            comment: None,
            evaluation: Some(4),
            image_id: None,
            like_count,
            comment_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<noodle::Model>::new()])
                .into_connection(),
        );

        let repo = NoodleRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NoodleNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_timeline() {
        let noodles = vec![
            create_test_noodle("n2", "user1", 0),
            create_test_noodle("n1", "user2", 3),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([noodles])
                .into_connection(),
        );

        let repo = NoodleRepository::new(db);
        let result = repo.find_timeline(10, Some("n3")).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "n2");
    }

    #[tokio::test]
    async fn test_adjust_like_count_returns_new_value() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_noodle("n1", "user1", 5)]])
                .into_connection(),
        );

        let repo = NoodleRepository::new(db);
        let count = repo.adjust_like_count("n1", 1).await.unwrap();

        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_adjust_comment_count_missing_noodle() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<noodle::Model>::new()])
                .into_connection(),
        );

        let repo = NoodleRepository::new(db);
        let result = repo.adjust_comment_count("missing", -1).await;

        assert!(matches!(result, Err(AppError::NoodleNotFound(_))));
    }
}
