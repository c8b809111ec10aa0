//! Like service.

use std::collections::HashMap;

use crate::services::notification::NotificationService;
use crate::services::toggle::{ToggleOutcome, resolve_toggle};
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::{like, noodle},
    repositories::{LikeRepository, NoodleRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::warn;

/// Level every like is recorded at.
const LIKE_LEVEL: i16 = 1;

/// State after toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResult {
    pub liked: bool,
    pub like_count: i32,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    noodle_repo: NoodleRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        noodle_repo: NoodleRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            like_repo,
            noodle_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a noodle, or withdraw an existing like.
    pub async fn toggle(&self, user_id: &str, noodle_id: &str) -> AppResult<LikeToggleResult> {
        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;

        if noodle.user_id == user_id {
            return Err(AppError::Validation(
                "You cannot like your own noodle".to_string(),
            ));
        }

        let existing = self
            .like_repo
            .find_by_user_and_noodle(user_id, noodle_id)
            .await?;
        let outcome = resolve_toggle(existing.as_ref().map(|_| LIKE_LEVEL), LIKE_LEVEL);

        match (outcome, existing) {
            (ToggleOutcome::Removed { .. }, Some(like)) => {
                if !self.like_repo.delete(like).await? {
                    return self.current_state(user_id, noodle_id).await;
                }
                if let Err(e) = self
                    .notification_service
                    .remove_like_notification(user_id, noodle_id)
                    .await
                {
                    warn!(noodle_id = %noodle_id, error = %e, "Failed to remove like notification");
                }
            }
            _ => {
                let model = like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    noodle_id: Set(noodle_id.to_string()),
                    created_at: Set(chrono::Utc::now().into()),
                };
                match self.like_repo.create(model).await {
                    Ok(_) => {}
                    Err(AppError::Conflict(_)) => {
                        return self.current_state(user_id, noodle_id).await;
                    }
                    Err(e) => return Err(e),
                }
                if let Err(e) = self
                    .notification_service
                    .create_like_notification(&noodle.user_id, user_id, noodle_id)
                    .await
                {
                    warn!(noodle_id = %noodle_id, error = %e, "Failed to create like notification");
                }
            }
        }

        let like_count = self
            .noodle_repo
            .adjust_like_count(noodle_id, outcome.counter_delta())
            .await?;

        Ok(LikeToggleResult {
            liked: outcome.is_active(),
            like_count,
        })
    }

    /// Stored like state, used when a concurrent toggle already applied
    /// the change so the counter must not move again.
    async fn current_state(&self, user_id: &str, noodle_id: &str) -> AppResult<LikeToggleResult> {
        let liked = self
            .like_repo
            .find_by_user_and_noodle(user_id, noodle_id)
            .await?
            .is_some();
        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;
        Ok(LikeToggleResult {
            liked,
            like_count: noodle.like_count,
        })
    }

    /// Like counts for a batch of noodles. Unknown ids count as zero.
    pub async fn counts(&self, noodle_ids: &[String]) -> AppResult<HashMap<String, i32>> {
        let mut counts: HashMap<String, i32> =
            noodle_ids.iter().map(|id| (id.clone(), 0)).collect();
        for noodle in self.noodle_repo.find_by_ids(noodle_ids).await? {
            counts.insert(noodle.id, noodle.like_count);
        }
        Ok(counts)
    }

    /// Which of `noodle_ids` the user has liked.
    pub async fn liked_ids(&self, user_id: &str, noodle_ids: &[String]) -> AppResult<Vec<String>> {
        self.like_repo
            .find_liked_noodle_ids(user_id, noodle_ids)
            .await
    }

    /// Noodles the user has liked, most recent like first.
    pub async fn liked_noodles(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<noodle::Model>> {
        let likes = self
            .like_repo
            .find_by_user(user_id, limit.clamp(1, 100), offset)
            .await?;
        let ids: Vec<String> = likes.iter().map(|l| l.noodle_id.clone()).collect();

        let mut by_id: HashMap<String, noodle::Model> = self
            .noodle_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use menlog_db::{entities::notification, repositories::NotificationRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_noodle(author: &str, like_count: i32) -> noodle::Model {
        noodle::Model {
            id: "n1".to_string(),
            user_id: author.to_string(),
            shop_id: "shop1".to_string(),
            ramen_name: "特製つけ麺".to_string(),
            genres: serde_json::json!([]),
            visit_date: None,
            comment: None,
            evaluation: None,
            image_id: None,
            like_count,
            comment_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_like() -> like::Model {
        like::Model {
            id: "like1".to_string(),
            user_id: "fan".to_string(),
            noodle_id: "n1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_notification() -> notification::Model {
        notification::Model {
            id: "notif1".to_string(),
            user_id: "author".to_string(),
            notification_type: notification::NotificationType::Like,
            from_user_id: "fan".to_string(),
            target_id: "n1".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service(
        like_db: DatabaseConnection,
        noodle_db: DatabaseConnection,
        notification_db: DatabaseConnection,
    ) -> LikeService {
        LikeService::new(
            LikeRepository::new(Arc::new(like_db)),
            NoodleRepository::new(Arc::new(noodle_db)),
            NotificationService::new(NotificationRepository::new(Arc::new(notification_db))),
        )
    }

    #[tokio::test]
    async fn test_cannot_like_own_noodle() {
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 0)]])
            .into_connection();

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            noodle_db,
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let result = service.toggle("author", "n1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_adds_like() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<like::Model>::new()])
            .append_query_results([[create_test_like()]])
            .into_connection();
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 0)]])
            .append_query_results([[create_test_noodle("author", 1)]])
            .into_connection();
        let notification_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_notification()]])
            .into_connection();

        let result = service(like_db, noodle_db, notification_db)
            .toggle("fan", "n1")
            .await
            .unwrap();

        assert_eq!(
            result,
            LikeToggleResult {
                liked: true,
                like_count: 1
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_removes_like() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_like()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 1)]])
            .append_query_results([[create_test_noodle("author", 0)]])
            .into_connection();
        let notification_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = service(like_db, noodle_db, notification_db)
            .toggle("fan", "n1")
            .await
            .unwrap();

        assert!(!result.liked);
        assert_eq!(result.like_count, 0);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<like::Model>::new()])
            .append_query_results([[create_test_like()]])
            .append_query_results([[create_test_like()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 3)]])
            .append_query_results([[create_test_noodle("author", 4)]])
            .append_query_results([[create_test_noodle("author", 4)]])
            .append_query_results([[create_test_noodle("author", 3)]])
            .into_connection();
        let notification_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_notification()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service(like_db, noodle_db, notification_db);
        let first = service.toggle("fan", "n1").await.unwrap();
        let second = service.toggle("fan", "n1").await.unwrap();

        assert_eq!(
            first,
            LikeToggleResult {
                liked: true,
                like_count: 4
            }
        );
        assert_eq!(
            second,
            LikeToggleResult {
                liked: false,
                like_count: 3
            }
        );
    }

    #[tokio::test]
    async fn test_unlike_already_removed_leaves_count_alone() {
        // A concurrent unlike deleted the row between our read and delete
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_like()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<like::Model>::new()])
            .into_connection();
        let noodle_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_noodle("author", 1)]])
                .append_query_results([[create_test_noodle("author", 0)]])
                .into_connection(),
        );

        let service = LikeService::new(
            LikeRepository::new(Arc::new(like_db)),
            NoodleRepository::new(Arc::clone(&noodle_db)),
            NotificationService::new(NotificationRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            ))),
        );

        let result = service.toggle("fan", "n1").await.unwrap();
        drop(service);

        assert_eq!(
            result,
            LikeToggleResult {
                liked: false,
                like_count: 0
            }
        );
        // Two reads of the noodle and no counter update
        let log = Arc::try_unwrap(noodle_db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|t| !format!("{t:?}").contains("UPDATE")));
    }

    #[tokio::test]
    async fn test_concurrent_like_conflict_reports_stored_state() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<like::Model>::new()])
            .append_query_errors([sea_orm::DbErr::Custom(
                "duplicate key value violates unique constraint \"idx_like_user_noodle\""
                    .to_string(),
            )])
            .append_query_results([[create_test_like()]])
            .into_connection();
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 0)]])
            .append_query_results([[create_test_noodle("author", 1)]])
            .into_connection();

        let result = service(
            like_db,
            noodle_db,
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )
        .toggle("fan", "n1")
        .await
        .unwrap();

        assert_eq!(
            result,
            LikeToggleResult {
                liked: true,
                like_count: 1
            }
        );
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_toggle() {
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<like::Model>::new()])
            .append_query_results([[create_test_like()]])
            .into_connection();
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 4)]])
            .append_query_results([[create_test_noodle("author", 5)]])
            .into_connection();

        let result = service(
            like_db,
            noodle_db,
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )
        .toggle("fan", "n1")
        .await
        .unwrap();

        assert!(result.liked);
        assert_eq!(result.like_count, 5);
    }

    #[tokio::test]
    async fn test_counts_default_to_zero() {
        let noodle_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_noodle("author", 7)]])
            .into_connection();

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            noodle_db,
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let counts = service
            .counts(&["n1".to_string(), "gone".to_string()])
            .await
            .unwrap();

        assert_eq!(counts["n1"], 7);
        assert_eq!(counts["gone"], 0);
    }
}
