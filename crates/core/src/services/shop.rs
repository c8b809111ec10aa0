//! Shop service.

use chrono::Utc;
use menlog_common::{AppError, AppResult, IdGenerator, extract_prefecture, is_prefecture};
use menlog_db::{entities::shop, repositories::ShopRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

/// Input for registering a shop.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShopInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(url)]
    pub url: Option<String>,
    /// Used when it names a real prefecture; otherwise derived from the address.
    pub prefecture: Option<String>,
}

/// Shop service for business logic.
#[derive(Clone)]
pub struct ShopService {
    shop_repo: ShopRepository,
    id_gen: IdGenerator,
}

impl ShopService {
    /// Create a new shop service.
    #[must_use]
    pub const fn new(shop_repo: ShopRepository) -> Self {
        Self {
            shop_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a shop, or return the existing one with the same name and address.
    pub async fn create(&self, input: CreateShopInput) -> AppResult<shop::Model> {
        let input = CreateShopInput {
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
            url: input.url.filter(|u| !u.trim().is_empty()),
            prefecture: input.prefecture,
        };
        input.validate()?;

        let prefecture = resolve_prefecture(input.prefecture.as_deref(), &input.address)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Could not determine prefecture from address: {}",
                    input.address
                ))
            })?;

        if let Some(existing) = self
            .shop_repo
            .find_by_name_and_address(&input.name, &input.address)
            .await?
        {
            return Ok(existing);
        }

        let model = shop::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.clone()),
            address: Set(input.address.clone()),
            url: Set(input.url),
            prefecture: Set(prefecture.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match self.shop_repo.create(model).await {
            Err(AppError::Conflict(_)) => {
                debug!(name = %input.name, "Shop created concurrently");
                self.shop_repo
                    .find_by_name_and_address(&input.name, &input.address)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Shop: {}", input.name)))
            }
            other => other,
        }
    }

    /// Get a shop.
    pub async fn get(&self, shop_id: &str) -> AppResult<shop::Model> {
        self.shop_repo.get_by_id(shop_id).await
    }

    /// Search shops by name.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<shop::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        self.shop_repo.search(query, limit.clamp(1, 100)).await
    }

    /// List shops in a prefecture.
    pub async fn list_by_prefecture(
        &self,
        prefecture: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<shop::Model>> {
        if !is_prefecture(prefecture) {
            return Err(AppError::BadRequest(format!(
                "Unknown prefecture: {prefecture}"
            )));
        }
        self.shop_repo
            .find_by_prefecture(prefecture, limit.clamp(1, 100), offset)
            .await
    }
}

/// Explicit prefecture if valid, else the one the address names.
fn resolve_prefecture<'a>(explicit: Option<&'a str>, address: &str) -> Option<&'a str> {
    explicit
        .map(str::trim)
        .filter(|p| is_prefecture(p))
        .or_else(|| extract_prefecture(address))
}
