//! Noodle service: logging, editing and reading shop visits.

use std::collections::{HashMap, HashSet};

use crate::services::badge::BadgeService;
use crate::services::user::UserSummary;
use chrono::{NaiveDate, Utc};
use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::{noodle, shop},
    repositories::{
        ImageRepository, LikeRepository, NoodleRepository, ShopRepository, UserRepository,
    },
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

/// Most genre tags a noodle may carry.
const MAX_GENRES: usize = 10;
/// Longest genre tag accepted.
const MAX_GENRE_CHARS: usize = 30;

/// Input for logging a noodle.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoodleInput {
    pub shop_id: String,
    #[validate(length(min = 1, max = 100))]
    pub ramen_name: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub genres: Vec<String>,
    pub visit_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub evaluation: Option<i16>,
    pub image_id: Option<String>,
}

/// Input for editing a noodle. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoodleInput {
    pub shop_id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub ramen_name: Option<String>,
    #[validate(length(max = 10))]
    pub genres: Option<Vec<String>>,
    pub visit_date: Option<NaiveDate>,
    /// Empty string clears the comment
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub evaluation: Option<i16>,
    pub image_id: Option<String>,
}

/// A noodle as shown to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoodleView {
    pub id: String,
    pub user: UserSummary,
    pub shop: shop::Model,
    pub ramen_name: String,
    pub genres: Vec<String>,
    pub visit_date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub evaluation: Option<i16>,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub comment_count: i32,
    pub liked_by_me: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Trim genre tags and enforce their limits.
fn normalize_genres(genres: Vec<String>) -> AppResult<Vec<String>> {
    if genres.len() > MAX_GENRES {
        return Err(AppError::Validation(format!(
            "At most {MAX_GENRES} genres are allowed"
        )));
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim().to_string();
        let chars = genre.chars().count();
        if chars == 0 || chars > MAX_GENRE_CHARS {
            return Err(AppError::Validation(format!(
                "Genre must be 1-{MAX_GENRE_CHARS} characters"
            )));
        }
        if seen.insert(genre.clone()) {
            normalized.push(genre);
        }
    }
    Ok(normalized)
}

fn unique<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    ids.cloned()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

/// Noodle service for business logic.
#[derive(Clone)]
pub struct NoodleService {
    noodle_repo: NoodleRepository,
    shop_repo: ShopRepository,
    user_repo: UserRepository,
    image_repo: ImageRepository,
    like_repo: LikeRepository,
    badge_service: BadgeService,
    id_gen: IdGenerator,
}

impl NoodleService {
    /// Create a new noodle service.
    #[must_use]
    pub const fn new(
        noodle_repo: NoodleRepository,
        shop_repo: ShopRepository,
        user_repo: UserRepository,
        image_repo: ImageRepository,
        like_repo: LikeRepository,
        badge_service: BadgeService,
    ) -> Self {
        Self {
            noodle_repo,
            shop_repo,
            user_repo,
            image_repo,
            like_repo,
            badge_service,
            id_gen: IdGenerator::new(),
        }
    }

    async fn check_image_owner(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        let image = self.image_repo.get_by_id(image_id).await?;
        if image.user_id != user_id {
            return Err(AppError::Forbidden(
                "Image belongs to another user".to_string(),
            ));
        }
        Ok(())
    }

    /// Refresh the badge for a prefecture. Failures are logged, not returned.
    async fn refresh_badge(&self, user_id: &str, prefecture: &str) {
        if let Err(e) = self.badge_service.upgrade(user_id, prefecture).await {
            warn!(user_id = %user_id, prefecture = %prefecture, error = %e, "Badge upgrade failed");
        }
    }

    /// Log a new noodle.
    pub async fn create(&self, user_id: &str, input: CreateNoodleInput) -> AppResult<noodle::Model> {
        input.validate()?;
        let ramen_name = input.ramen_name.trim().to_string();
        if ramen_name.is_empty() {
            return Err(AppError::Validation("Ramen name must not be blank".to_string()));
        }
        let genres = normalize_genres(input.genres)?;

        let shop = self.shop_repo.get_by_id(&input.shop_id).await?;

        if let Some(image_id) = &input.image_id {
            self.check_image_owner(user_id, image_id).await?;
        }

        let model = noodle::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            shop_id: Set(shop.id.clone()),
            ramen_name: Set(ramen_name),
            genres: Set(serde_json::json!(genres)),
            visit_date: Set(input.visit_date),
            comment: Set(input.comment.filter(|c| !c.trim().is_empty())),
            evaluation: Set(input.evaluation),
            image_id: Set(input.image_id),
            like_count: Set(0),
            comment_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.noodle_repo.create(model).await?;

        self.refresh_badge(user_id, &shop.prefecture).await;

        Ok(created)
    }

    async fn get_owned(&self, user_id: &str, noodle_id: &str) -> AppResult<noodle::Model> {
        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;
        if noodle.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can modify this noodle".to_string(),
            ));
        }
        Ok(noodle)
    }

    /// Edit a noodle (author only).
    pub async fn update(
        &self,
        user_id: &str,
        noodle_id: &str,
        input: UpdateNoodleInput,
    ) -> AppResult<noodle::Model> {
        input.validate()?;
        let noodle = self.get_owned(user_id, noodle_id).await?;
        let previous_shop_id = noodle.shop_id.clone();
        let mut active: noodle::ActiveModel = noodle.into();

        let mut moved_to: Option<shop::Model> = None;
        if let Some(shop_id) = input.shop_id.filter(|id| *id != previous_shop_id) {
            let shop = self.shop_repo.get_by_id(&shop_id).await?;
            active.shop_id = Set(shop.id.clone());
            moved_to = Some(shop);
        }
        if let Some(name) = input.ramen_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Validation("Ramen name must not be blank".to_string()));
            }
            active.ramen_name = Set(name.to_string());
        }
        if let Some(genres) = input.genres {
            active.genres = Set(serde_json::json!(normalize_genres(genres)?));
        }
        if let Some(visit_date) = input.visit_date {
            active.visit_date = Set(Some(visit_date));
        }
        if let Some(comment) = input.comment {
            active.comment = Set(Some(comment).filter(|c| !c.trim().is_empty()));
        }
        if let Some(evaluation) = input.evaluation {
            active.evaluation = Set(Some(evaluation));
        }
        if let Some(image_id) = input.image_id {
            self.check_image_owner(user_id, &image_id).await?;
            active.image_id = Set(Some(image_id));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.noodle_repo.update(active).await?;

        if let Some(new_shop) = moved_to {
            self.refresh_badge(user_id, &new_shop.prefecture).await;
            if let Ok(Some(old_shop)) = self.shop_repo.find_by_id(&previous_shop_id).await {
                self.refresh_badge(user_id, &old_shop.prefecture).await;
            }
        }

        Ok(updated)
    }

    /// Delete a noodle (author only). Badge tiers stay; visit counts refresh.
    pub async fn delete(&self, user_id: &str, noodle_id: &str) -> AppResult<()> {
        let noodle = self.get_owned(user_id, noodle_id).await?;
        let shop_id = noodle.shop_id.clone();

        self.noodle_repo.delete(noodle).await?;

        match self.shop_repo.find_by_id(&shop_id).await {
            Ok(Some(shop)) => self.refresh_badge(user_id, &shop.prefecture).await,
            Ok(None) => {}
            Err(e) => warn!(shop_id = %shop_id, error = %e, "Shop lookup after delete failed"),
        }

        Ok(())
    }

    /// A single noodle with author, shop, image and viewer state.
    pub async fn get(&self, noodle_id: &str, viewer_id: Option<&str>) -> AppResult<NoodleView> {
        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;
        self.pack_many(vec![noodle], viewer_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NoodleNotFound(noodle_id.to_string()))
    }

    /// Global timeline.
    pub async fn timeline(
        &self,
        limit: u64,
        until_id: Option<&str>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<NoodleView>> {
        let noodles = self
            .noodle_repo
            .find_timeline(limit.clamp(1, 100), until_id)
            .await?;
        self.pack_many(noodles, viewer_id).await
    }

    /// A user's noodles.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<NoodleView>> {
        let noodles = self
            .noodle_repo
            .find_by_user(user_id, limit.clamp(1, 100), until_id)
            .await?;
        self.pack_many(noodles, viewer_id).await
    }

    /// Noodles eaten at a shop.
    pub async fn list_by_shop(
        &self,
        shop_id: &str,
        limit: u64,
        until_id: Option<&str>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<NoodleView>> {
        let noodles = self
            .noodle_repo
            .find_by_shop(shop_id, limit.clamp(1, 100), until_id)
            .await?;
        self.pack_many(noodles, viewer_id).await
    }

    /// Attach authors, shops, image URLs and `liked_by_me` to noodles.
    ///
    /// Noodles whose author is missing or soft-deleted, or whose shop is
    /// gone, are dropped. Input order is preserved.
    pub async fn pack_many(
        &self,
        noodles: Vec<noodle::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<NoodleView>> {
        if noodles.is_empty() {
            return Ok(vec![]);
        }

        let user_ids = unique(noodles.iter().map(|n| &n.user_id));
        let shop_ids = unique(noodles.iter().map(|n| &n.shop_id));
        let image_ids = unique(noodles.iter().filter_map(|n| n.image_id.as_ref()));
        let noodle_ids: Vec<String> = noodles.iter().map(|n| n.id.clone()).collect();

        let users: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .filter(|u| !u.is_deleted())
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();
        let shops: HashMap<String, shop::Model> = self
            .shop_repo
            .find_by_ids(&shop_ids)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let image_urls: HashMap<String, String> = self
            .image_repo
            .find_by_ids(&image_ids)
            .await?
            .into_iter()
            .map(|i| (i.id, i.url))
            .collect();
        let liked: HashSet<String> = match viewer_id {
            Some(viewer) => self
                .like_repo
                .find_liked_noodle_ids(viewer, &noodle_ids)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(noodles
            .into_iter()
            .filter_map(|n| {
                let user = users.get(&n.user_id)?.clone();
                let shop = shops.get(&n.shop_id)?.clone();
                let genres = n.genre_list();
                let image_url = n.image_id.as_ref().and_then(|id| image_urls.get(id).cloned());
                Some(NoodleView {
                    liked_by_me: liked.contains(&n.id),
                    id: n.id,
                    user,
                    shop,
                    ramen_name: n.ramen_name,
                    genres,
                    visit_date: n.visit_date,
                    comment: n.comment,
                    evaluation: n.evaluation,
                    image_id: n.image_id,
                    image_url,
                    like_count: n.like_count,
                    comment_count: n.comment_count,
                    created_at: n.created_at,
                    updated_at: n.updated_at,
                })
            })
            .collect())
    }
}
