//! Comment service.

use std::collections::{HashMap, HashSet};

use crate::services::notification::NotificationService;
use crate::services::user::UserSummary;
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::comment,
    repositories::{CommentLikeRepository, CommentRepository, NoodleRepository, UserRepository},
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Serialize;
use tracing::warn;

/// Longest comment accepted, in characters after trimming.
pub const MAX_COMMENT_CHARS: usize = 500;

/// A comment as shown to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub noodle_id: String,
    pub user: UserSummary,
    pub content: String,
    pub like_count: i32,
    pub liked_by_me: bool,
    pub created_at: DateTimeWithTimeZone,
}

/// Trim comment content and check its length.
fn normalize_content(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    let chars = trimmed.chars().count();
    if chars == 0 || chars > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "Comment must be 1-{MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    comment_like_repo: CommentLikeRepository,
    noodle_repo: NoodleRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        comment_like_repo: CommentLikeRepository,
        noodle_repo: NoodleRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            comment_like_repo,
            noodle_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a noodle.
    pub async fn create(
        &self,
        user_id: &str,
        noodle_id: &str,
        content: &str,
    ) -> AppResult<comment::Model> {
        let content = normalize_content(content)?;
        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            noodle_id: Set(noodle.id.clone()),
            user_id: Set(user_id.to_string()),
            content: Set(content),
            like_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.comment_repo.create(model).await?;

        self.noodle_repo.adjust_comment_count(&noodle.id, 1).await?;

        if let Err(e) = self
            .notification_service
            .create_comment_notification(&noodle.user_id, user_id, &noodle.id)
            .await
        {
            warn!(noodle_id = %noodle.id, error = %e, "Failed to create comment notification");
        }

        Ok(created)
    }

    /// Delete a comment (author only).
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        let noodle_id = comment.noodle_id.clone();
        // A concurrent delete already decremented the count
        if self.comment_repo.delete(comment).await? {
            self.noodle_repo.adjust_comment_count(&noodle_id, -1).await?;
        }

        Ok(())
    }

    /// Comments on a noodle, oldest first. Comments by deleted users are hidden.
    pub async fn list(&self, noodle_id: &str, viewer_id: Option<&str>) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_noodle(noodle_id).await?;
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<String> = comments
            .iter()
            .map(|c| c.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .filter(|u| !u.is_deleted())
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        let liked: HashSet<String> = match viewer_id {
            Some(viewer) => {
                let comment_ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
                self.comment_like_repo
                    .find_liked_comment_ids(viewer, &comment_ids)
                    .await?
                    .into_iter()
                    .collect()
            }
            None => HashSet::new(),
        };

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let user = users.get(&c.user_id)?.clone();
                Some(CommentView {
                    liked_by_me: liked.contains(&c.id),
                    id: c.id,
                    noodle_id: c.noodle_id,
                    user,
                    content: c.content,
                    like_count: c.like_count,
                    created_at: c.created_at,
                })
            })
            .collect())
    }

    /// Comment counts for a batch of noodles. Unknown ids count as zero.
    pub async fn counts(&self, noodle_ids: &[String]) -> AppResult<HashMap<String, i32>> {
        let mut counts: HashMap<String, i32> =
            noodle_ids.iter().map(|id| (id.clone(), 0)).collect();
        for noodle in self.noodle_repo.find_by_ids(noodle_ids).await? {
            counts.insert(noodle.id, noodle.comment_count);
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use menlog_db::{
        entities::{noodle, notification, user},
        repositories::NotificationRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn create_test_noodle(comment_count: i32) -> noodle::Model {
        noodle::Model {
            id: "n1".to_string(),
            user_id: "author".to_string(),
            shop_id: "shop1".to_string(),
            ramen_name: "塩らーめん".to_string(),
            genres: serde_json::json!(["塩"]),
            visit_date: None,
            comment: None,
            evaluation: None,
            image_id: None,
            like_count: 0,
            comment_count,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            noodle_id: "n1".to_string(),
            user_id: user_id.to_string(),
            content: "スープが最高".to_string(),
            like_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_user(id: &str, deleted: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            external_auth_id: format!("auth|{id}"),
            name: id.to_string(),
            email: None,
            image: None,
            selected_theme_level: 0,
            deleted_at: deleted.then(|| Utc::now().into()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(
        comment_db: DatabaseConnection,
        comment_like_db: DatabaseConnection,
        noodle_db: DatabaseConnection,
        user_db: DatabaseConnection,
        notification_db: DatabaseConnection,
    ) -> CommentService {
        CommentService::new(
            CommentRepository::new(Arc::new(comment_db)),
            CommentLikeRepository::new(Arc::new(comment_like_db)),
            NoodleRepository::new(Arc::new(noodle_db)),
            UserRepository::new(Arc::new(user_db)),
            NotificationService::new(NotificationRepository::new(Arc::new(notification_db))),
        )
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("  うまい \n").unwrap(), "うまい");
        assert!(normalize_content("   ").is_err());
        assert!(normalize_content(&"麺".repeat(500)).is_ok());
        assert!(normalize_content(&"麺".repeat(501)).is_err());
    }

    #[tokio::test]
    async fn test_create_blank_comment_rejected() {
        let service = service(
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
        );

        let result = service.create("fan", "n1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_comment_notifies_author() {
        let comment_db = mock()
            .append_query_results([[create_test_comment("c1", "fan")]])
            .into_connection();
        let noodle_db = mock()
            .append_query_results([[create_test_noodle(0)]])
            .append_query_results([[create_test_noodle(1)]])
            .into_connection();
        let notification_db = mock()
            .append_query_results([[notification::Model {
                id: "notif1".to_string(),
                user_id: "author".to_string(),
                notification_type: notification::NotificationType::Comment,
                from_user_id: "fan".to_string(),
                target_id: "n1".to_string(),
                is_read: false,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let service = service(
            comment_db,
            mock().into_connection(),
            noodle_db,
            mock().into_connection(),
            notification_db,
        );

        let created = service.create("fan", "n1", " スープが最高 ").await.unwrap();

        assert_eq!(created.id, "c1");
    }

    #[tokio::test]
    async fn test_delete_by_non_author() {
        let comment_db = mock()
            .append_query_results([[create_test_comment("c1", "fan")]])
            .into_connection();

        let service = service(
            comment_db,
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
        );

        let result = service.delete("someone", "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_decrements_counter() {
        let comment_db = mock()
            .append_query_results([[create_test_comment("c1", "fan")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let noodle_db = mock()
            .append_query_results([[create_test_noodle(0)]])
            .into_connection();

        let service = service(
            comment_db,
            mock().into_connection(),
            noodle_db,
            mock().into_connection(),
            mock().into_connection(),
        );

        assert!(service.delete("fan", "c1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_already_removed_skips_counter() {
        let comment_db = mock()
            .append_query_results([[create_test_comment("c1", "fan")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        // No noodle results: touching the counter would fail the call
        let service = service(
            comment_db,
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
            mock().into_connection(),
        );

        assert!(service.delete("fan", "c1").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_hides_deleted_users() {
        let comment_db = mock()
            .append_query_results([[
                create_test_comment("c1", "alive"),
                create_test_comment("c2", "gone"),
            ]])
            .into_connection();
        let user_db = mock()
            .append_query_results([[
                create_test_user("alive", false),
                create_test_user("gone", true),
            ]])
            .into_connection();

        let service = service(
            comment_db,
            mock().into_connection(),
            mock().into_connection(),
            user_db,
            mock().into_connection(),
        );

        let comments = service.list("n1", None).await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "c1");
        assert!(!comments[0].liked_by_me);
    }
}
