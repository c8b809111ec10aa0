//! Feedback board: suggestions with graded "steam" reactions.

use std::collections::HashMap;

use crate::services::toggle::{ToggleOutcome, resolve_toggle};
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::{
        feedback::{self, FeedbackCategory},
        feedback_steam,
    },
    repositories::{FeedbackRepository, FeedbackSort, FeedbackSteamRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

const MAX_MESSAGE_CHARS: usize = 1000;

/// Input for posting feedback.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackInput {
    pub category: FeedbackCategory,
    pub message: String,
    #[validate(range(min = 1, max = 3))]
    pub heat_level: i16,
}

/// State after steaming a feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamResult {
    /// The caller's current level, `None` once withdrawn
    pub heat_level: Option<i16>,
    pub steam_count: i32,
}

fn check_heat_level(level: i16) -> AppResult<()> {
    if (1..=3).contains(&level) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Heat level must be between 1 and 3".to_string(),
        ))
    }
}

/// Feedback service for business logic.
#[derive(Clone)]
pub struct FeedbackService {
    feedback_repo: FeedbackRepository,
    steam_repo: FeedbackSteamRepository,
    id_gen: IdGenerator,
}

impl FeedbackService {
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(feedback_repo: FeedbackRepository, steam_repo: FeedbackSteamRepository) -> Self {
        Self {
            feedback_repo,
            steam_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post feedback.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateFeedbackInput,
    ) -> AppResult<feedback::Model> {
        input.validate()?;

        let message = input.message.trim();
        let chars = message.chars().count();
        if chars == 0 || chars > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "Message must be 1-{MAX_MESSAGE_CHARS} characters"
            )));
        }

        let model = feedback::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            category: Set(input.category),
            message: Set(message.to_string()),
            heat_level: Set(input.heat_level),
            steam_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.feedback_repo.create(model).await
    }

    /// List feedback.
    pub async fn list(
        &self,
        sort: FeedbackSort,
        limit: Option<u64>,
        offset: u64,
    ) -> AppResult<Vec<feedback::Model>> {
        self.feedback_repo
            .list(sort, limit.unwrap_or(20).clamp(1, 100), offset)
            .await
    }

    /// Delete feedback (author only).
    pub async fn delete(&self, user_id: &str, feedback_id: &str) -> AppResult<()> {
        let feedback = self.feedback_repo.get_by_id(feedback_id).await?;
        if feedback.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this feedback".to_string(),
            ));
        }
        self.feedback_repo.delete(feedback).await
    }

    /// Steam a feedback at `heat_level`.
    ///
    /// The same level again withdraws the steam; a different level replaces it.
    pub async fn steam(
        &self,
        user_id: &str,
        feedback_id: &str,
        heat_level: i16,
    ) -> AppResult<SteamResult> {
        check_heat_level(heat_level)?;
        let feedback = self.feedback_repo.get_by_id(feedback_id).await?;

        let existing = self
            .steam_repo
            .find_by_user_and_feedback(user_id, &feedback.id)
            .await?;
        let outcome = resolve_toggle(existing.as_ref().map(|s| s.heat_level), heat_level);

        match (outcome, existing) {
            (ToggleOutcome::Removed { .. }, Some(steam)) => {
                if !self.steam_repo.delete(steam).await? {
                    return self.current_steam(user_id, &feedback.id).await;
                }
            }
            (ToggleOutcome::Changed { from, to }, Some(steam)) => {
                if !self.steam_repo.update_level(&steam.id, from, to).await? {
                    return self.current_steam(user_id, &feedback.id).await;
                }
            }
            _ => {
                let model = feedback_steam::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    feedback_id: Set(feedback.id.clone()),
                    user_id: Set(user_id.to_string()),
                    heat_level: Set(heat_level),
                    created_at: Set(chrono::Utc::now().into()),
                };
                match self.steam_repo.create(model).await {
                    Ok(_) => {}
                    Err(AppError::Conflict(_)) => {
                        return self.current_steam(user_id, &feedback.id).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let steam_count = self
            .feedback_repo
            .adjust_steam_count(&feedback.id, outcome.counter_delta())
            .await?;

        Ok(SteamResult {
            heat_level: outcome.current_level(),
            steam_count,
        })
    }

    /// Stored steam state, used when a concurrent steam already applied the
    /// change.
    async fn current_steam(&self, user_id: &str, feedback_id: &str) -> AppResult<SteamResult> {
        let heat_level = self
            .steam_repo
            .find_by_user_and_feedback(user_id, feedback_id)
            .await?
            .map(|s| s.heat_level);
        let feedback = self.feedback_repo.get_by_id(feedback_id).await?;
        Ok(SteamResult {
            heat_level,
            steam_count: feedback.steam_count,
        })
    }

    /// The caller's steam level on each of `feedback_ids` they reacted to.
    pub async fn my_steams(
        &self,
        user_id: &str,
        feedback_ids: &[String],
    ) -> AppResult<HashMap<String, i16>> {
        Ok(self
            .steam_repo
            .find_by_user_and_feedbacks(user_id, feedback_ids)
            .await?
            .into_iter()
            .map(|s| (s.feedback_id, s.heat_level))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_feedback(steam_count: i32) -> feedback::Model {
        feedback::Model {
            id: "fb1".to_string(),
            user_id: "author".to_string(),
            category: FeedbackCategory::Feature,
            message: "地図から店を探したい".to_string(),
            heat_level: 2,
            steam_count,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_steam(heat_level: i16) -> feedback_steam::Model {
        feedback_steam::Model {
            id: "st1".to_string(),
            feedback_id: "fb1".to_string(),
            user_id: "fan".to_string(),
            heat_level,
            created_at: Utc::now().into(),
        }
    }

    fn service(feedback_db: DatabaseConnection, steam_db: DatabaseConnection) -> FeedbackService {
        FeedbackService::new(
            FeedbackRepository::new(Arc::new(feedback_db)),
            FeedbackSteamRepository::new(Arc::new(steam_db)),
        )
    }

    fn empty() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[tokio::test]
    async fn test_create_rejects_blank_message() {
        let input = CreateFeedbackInput {
            category: FeedbackCategory::Bug,
            message: "   ".to_string(),
            heat_level: 1,
        };

        let result = service(empty(), empty()).create("user1", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_heat_out_of_range() {
        let input = CreateFeedbackInput {
            category: FeedbackCategory::Ui,
            message: "ボタンが小さい".to_string(),
            heat_level: 4,
        };

        let result = service(empty(), empty()).create("user1", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_steam_same_level_withdraws() {
        let feedback_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_feedback(5)]])
            .append_query_results([[create_test_feedback(2)]])
            .into_connection();
        let steam_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_steam(3)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = service(feedback_db, steam_db)
            .steam("fan", "fb1", 3)
            .await
            .unwrap();

        assert_eq!(
            result,
            SteamResult {
                heat_level: None,
                steam_count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_steam_different_level_changes() {
        let feedback_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_feedback(1)]])
            .append_query_results([[create_test_feedback(3)]])
            .into_connection();
        let steam_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_steam(1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = service(feedback_db, steam_db)
            .steam("fan", "fb1", 3)
            .await
            .unwrap();

        assert_eq!(result.heat_level, Some(3));
        assert_eq!(result.steam_count, 3);
    }

    #[tokio::test]
    async fn test_steam_change_lost_to_concurrent_update_keeps_count() {
        // The row moved to level 2 between our read and our update
        let feedback_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_feedback(2)]])
            .append_query_results([[create_test_feedback(2)]])
            .into_connection();
        let steam_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_steam(1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[create_test_steam(2)]])
            .into_connection();

        let service = service(feedback_db, steam_db);
        let result = service.steam("fan", "fb1", 3).await.unwrap();

        assert_eq!(
            result,
            SteamResult {
                heat_level: Some(2),
                steam_count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_steam_rejects_bad_level() {
        let result = service(empty(), empty()).steam("fan", "fb1", 0).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner() {
        let feedback_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_feedback(0)]])
            .into_connection();

        let result = service(feedback_db, empty()).delete("fan", "fb1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
