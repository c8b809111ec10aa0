//! Common utilities and shared types for menlog.
//!
//! This crate provides foundational components used across all menlog crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Prefectures**: The 47 Japanese prefectures and address parsing
//! - **Storage**: Object storage for uploaded images
//! - **Shop info**: Shop name/address extraction from listing pages
//! - **Shop info cache**: Redis-backed caching for extracted shop info

pub mod config;
pub mod error;
pub mod id;
pub mod prefecture;
pub mod shop_info;
pub mod shop_info_cache;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use prefecture::{PREFECTURES, extract_prefecture, is_prefecture, prefecture_code};
pub use shop_info::{ShopInfo, ShopInfoError, ShopSource, extract_shop_info, fetch_shop_info};
pub use shop_info_cache::{ShopInfoCache, ShopInfoCacheError};
pub use storage::{LocalStorage, StorageBackend, StoredObject, generate_storage_key};
