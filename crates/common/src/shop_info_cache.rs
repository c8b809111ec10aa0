//! Redis cache for extracted shop information.
//!
//! Listing pages rarely change, and fetching them is slow and impolite to
//! repeat, so successful extractions are kept for a day. Failures are never
//! cached: the caller gets the error and may retry.

use std::sync::Arc;

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use tracing::{debug, warn};

use crate::config::ShopInfoSettings;
use crate::shop_info::{ShopInfo, ShopInfoError, fetch_shop_info};

/// Default cache TTL: 24 hours.
const DEFAULT_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Shop-info cache backed by Redis.
#[derive(Clone)]
pub struct ShopInfoCache {
    redis: Arc<RedisClient>,
    prefix: String,
    ttl_secs: i64,
}

impl ShopInfoCache {
    /// Create a new cache with the default TTL.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    fn cache_key(&self, url: &str) -> String {
        format!("{}:shop_info:{url}", self.prefix)
    }

    /// Get cached shop info.
    pub async fn get(&self, url: &str) -> Result<Option<ShopInfo>, ShopInfoCacheError> {
        let result: Option<String> = self
            .redis
            .get(self.cache_key(url))
            .await
            .map_err(|e| ShopInfoCacheError::Redis(e.to_string()))?;

        match result {
            Some(json_str) => {
                let info = serde_json::from_str(&json_str)
                    .map_err(|e| ShopInfoCacheError::Serialization(e.to_string()))?;
                debug!(url = %url, "Cache hit for shop info");
                Ok(Some(info))
            }
            None => {
                debug!(url = %url, "Cache miss for shop info");
                Ok(None)
            }
        }
    }

    /// Store shop info under the URL it was requested with.
    pub async fn set(&self, url: &str, info: &ShopInfo) -> Result<(), ShopInfoCacheError> {
        let json_str = serde_json::to_string(info)
            .map_err(|e| ShopInfoCacheError::Serialization(e.to_string()))?;

        self.redis
            .set::<(), _, _>(
                self.cache_key(url),
                json_str,
                Some(Expiration::EX(self.ttl_secs)),
                None,
                false,
            )
            .await
            .map_err(|e| ShopInfoCacheError::Redis(e.to_string()))
    }

    /// Return cached info or fetch, caching a successful result.
    ///
    /// Cache failures degrade to a plain fetch.
    pub async fn get_or_fetch(
        &self,
        url: &str,
        settings: &ShopInfoSettings,
    ) -> Result<ShopInfo, ShopInfoError> {
        match self.get(url).await {
            Ok(Some(info)) => return Ok(info),
            Ok(None) => {}
            Err(e) => warn!(url = %url, error = %e, "Shop info cache read failed"),
        }

        let info = fetch_shop_info(url, settings).await?;

        if let Err(e) = self.set(url, &info).await {
            warn!(url = %url, error = %e, "Shop info cache write failed");
        }

        Ok(info)
    }
}

/// Shop-info cache error type.
#[derive(Debug, thiserror::Error)]
pub enum ShopInfoCacheError {
    /// Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
