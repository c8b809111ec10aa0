//! Notification service.

use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Default page size for notification listings.
const DEFAULT_LIMIT: u64 = 20;
/// Largest page a client may request.
const MAX_LIMIT: u64 = 100;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Notify a noodle's author that it was liked.
    ///
    /// Returns `None` without writing anything when the author liked it themselves.
    pub async fn create_like_notification(
        &self,
        recipient_id: &str,
        actor_id: &str,
        noodle_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.create_internal(recipient_id, actor_id, NotificationType::Like, noodle_id)
            .await
    }

    /// Notify a noodle's author about a new comment.
    pub async fn create_comment_notification(
        &self,
        recipient_id: &str,
        actor_id: &str,
        noodle_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.create_internal(recipient_id, actor_id, NotificationType::Comment, noodle_id)
            .await
    }

    /// Withdraw the notification produced by a like.
    pub async fn remove_like_notification(&self, actor_id: &str, noodle_id: &str) -> AppResult<()> {
        self.notification_repo
            .delete_like_notification(actor_id, noodle_id)
            .await?;
        Ok(())
    }

    async fn create_internal(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        target_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        // Don't notify yourself
        if recipient_id == actor_id {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(recipient_id.to_string()),
            notification_type: Set(notification_type),
            from_user_id: Set(actor_id.to_string()),
            target_id: Set(target_id.to_string()),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await.map(Some)
    }

    /// List a user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: Option<u64>,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.notification_repo
            .find_by_user(user_id, limit, until_id, unread_only)
            .await
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one of the user's own notifications as read.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self
            .notification_repo
            .mark_as_read(user_id, notification_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Notification: {notification_id}"
            )))
        }
    }

    /// Mark all of a user's notifications as read.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }
}
