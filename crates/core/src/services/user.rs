//! User service.

use crate::services::auth::IdentityClaims;
use crate::services::badge::BadgeService;
use chrono::Utc;
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Highest selectable theme level.
pub const MAX_THEME_LEVEL: i16 = 3;
/// Longest display name accepted.
const MAX_NAME_CHARS: usize = 50;
/// Name used when the identity provider sends neither name nor email.
const FALLBACK_NAME: &str = "ゲスト";

/// Public view of a user embedded in other responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub selected_theme_level: i16,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
            selected_theme_level: user.selected_theme_level,
        }
    }
}

/// Input for updating a profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    pub image: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    badge_service: BadgeService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, badge_service: BadgeService) -> Self {
        Self {
            user_repo,
            badge_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create or refresh the local user for an identity.
    ///
    /// A soft-deleted user signing in again is restored.
    pub async fn store(&self, claims: &IdentityClaims) -> AppResult<user::Model> {
        let name = display_name(claims);
        let now = Utc::now();

        match self.user_repo.find_by_external_auth_id(&claims.sub).await? {
            Some(existing) => {
                let restored = existing.is_deleted();
                let mut active: user::ActiveModel = existing.into();
                active.name = Set(name);
                active.email = Set(claims.email.clone());
                active.image = Set(claims.picture.clone());
                active.deleted_at = Set(None);
                active.updated_at = Set(Some(now.into()));
                let user = self.user_repo.update(active).await?;
                if restored {
                    tracing::info!(user_id = %user.id, "Restored soft-deleted user");
                }
                Ok(user)
            }
            None => {
                let model = user::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    external_auth_id: Set(claims.sub.clone()),
                    name: Set(name),
                    email: Set(claims.email.clone()),
                    image: Set(claims.picture.clone()),
                    selected_theme_level: Set(0),
                    deleted_at: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };
                let user = self.user_repo.create(model).await?;
                tracing::info!(user_id = %user.id, "Registered user");
                Ok(user)
            }
        }
    }

    /// Get an active user.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_active(user_id).await
    }

    /// Get the active user for an identity-provider subject.
    pub async fn me(&self, external_auth_id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_external_auth_id(external_auth_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| AppError::UserNotFound(external_auth_id.to_string()))
    }

    /// Update name and/or avatar.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.get(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Validation("Name must not be blank".to_string()));
            }
            active.name = Set(name.to_string());
        }
        if let Some(image) = input.image {
            active.image = Set(Some(image).filter(|s| !s.is_empty()));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Select a theme unlocked by the user's badges.
    ///
    /// Level `n` needs a badge of tier rank `n` or higher; 0 is always allowed.
    pub async fn set_theme_level(&self, user_id: &str, level: i16) -> AppResult<user::Model> {
        if !(0..=MAX_THEME_LEVEL).contains(&level) {
            return Err(AppError::Validation(format!(
                "Theme level must be between 0 and {MAX_THEME_LEVEL}"
            )));
        }

        let user = self.get(user_id).await?;

        let unlocked = self.badge_service.highest_rank(user_id).await?;
        if level > unlocked {
            return Err(AppError::Forbidden(format!(
                "Theme level {level} is locked (unlocked up to {unlocked})"
            )));
        }

        let mut active: user::ActiveModel = user.into();
        active.selected_theme_level = Set(level);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Soft-delete a user.
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        let user = self.get(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));
        self.user_repo.update(active).await?;
        tracing::info!(user_id = %user_id, "Soft-deleted user");
        Ok(())
    }

    /// List active users, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_active(limit.clamp(1, 100), offset).await
    }
}

/// Pick a display name from identity claims, capped at 50 characters.
fn display_name(claims: &IdentityClaims) -> String {
    let raw = claims
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| {
            claims
                .email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
        })
        .unwrap_or(FALLBACK_NAME);

    raw.chars().take(MAX_NAME_CHARS).collect()
}
