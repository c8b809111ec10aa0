//! Comment like service.

use crate::services::toggle::{ToggleOutcome, resolve_toggle};
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::comment_like,
    repositories::{CommentLikeRepository, CommentRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// State after toggling a comment like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeToggleResult {
    pub liked: bool,
    pub like_count: i32,
}

/// Comment like service. Comment likes do not notify.
#[derive(Clone)]
pub struct CommentLikeService {
    comment_like_repo: CommentLikeRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl CommentLikeService {
    /// Create a new comment like service.
    #[must_use]
    pub const fn new(
        comment_like_repo: CommentLikeRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            comment_like_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a comment, or withdraw an existing like.
    pub async fn toggle(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<CommentLikeToggleResult> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        let existing = self
            .comment_like_repo
            .find_by_user_and_comment(user_id, &comment.id)
            .await?;
        let outcome = resolve_toggle(existing.as_ref().map(|_| 1), 1);

        match (outcome, existing) {
            (ToggleOutcome::Removed { .. }, Some(like)) => {
                if !self.comment_like_repo.delete(like).await? {
                    return self.current_state(user_id, &comment.id).await;
                }
            }
            _ => {
                let model = comment_like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    comment_id: Set(comment.id.clone()),
                    created_at: Set(chrono::Utc::now().into()),
                };
                match self.comment_like_repo.create(model).await {
                    Ok(_) => {}
                    Err(AppError::Conflict(_)) => {
                        return self.current_state(user_id, &comment.id).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let like_count = self
            .comment_repo
            .adjust_like_count(&comment.id, outcome.counter_delta())
            .await?;

        Ok(CommentLikeToggleResult {
            liked: outcome.is_active(),
            like_count,
        })
    }

    async fn current_state(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<CommentLikeToggleResult> {
        let liked = self
            .comment_like_repo
            .find_by_user_and_comment(user_id, comment_id)
            .await?
            .is_some();
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        Ok(CommentLikeToggleResult {
            liked,
            like_count: comment.like_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use menlog_db::entities::comment;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_comment(like_count: i32) -> comment::Model {
        comment::Model {
            id: "c1".to_string(),
            noodle_id: "n1".to_string(),
            user_id: "author".to_string(),
            content: "替え玉必須".to_string(),
            like_count,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment_like() -> comment_like::Model {
        comment_like::Model {
            id: "cl1".to_string(),
            user_id: "fan".to_string(),
            comment_id: "c1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<comment_like::Model>::new()])
            .append_query_results([[create_test_comment_like()]])
            .append_query_results([[create_test_comment_like()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_comment(2)]])
            .append_query_results([[create_test_comment(3)]])
            .append_query_results([[create_test_comment(3)]])
            .append_query_results([[create_test_comment(2)]])
            .into_connection();

        let service = CommentLikeService::new(
            CommentLikeRepository::new(Arc::new(like_db)),
            CommentRepository::new(Arc::new(comment_db)),
        );

        let first = service.toggle("fan", "c1").await.unwrap();
        assert!(first.liked);
        assert_eq!(first.like_count, 3);

        let second = service.toggle("fan", "c1").await.unwrap();
        assert!(!second.liked);
        assert_eq!(second.like_count, 2);
    }

    #[tokio::test]
    async fn test_unlike_already_removed_leaves_count_alone() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_comment_like()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<comment_like::Model>::new()])
            .into_connection();
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment(1)]])
                .append_query_results([[create_test_comment(0)]])
                .into_connection(),
        );

        let service = CommentLikeService::new(
            CommentLikeRepository::new(Arc::new(like_db)),
            CommentRepository::new(Arc::clone(&comment_db)),
        );

        let result = service.toggle("fan", "c1").await.unwrap();
        drop(service);

        assert!(!result.liked);
        assert_eq!(result.like_count, 0);
        let log = Arc::try_unwrap(comment_db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|t| !format!("{t:?}").contains("UPDATE")));
    }

    #[tokio::test]
    async fn test_toggle_missing_comment() {
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<comment::Model>::new()])
            .into_connection();

        let service = CommentLikeService::new(
            CommentLikeRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            CommentRepository::new(Arc::new(comment_db)),
        );

        let result = service.toggle("fan", "c1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
