//! Object storage for uploaded noodle images.
//!
//! Images are written under an opaque key and resolved to a public URL on
//! read. Only the local filesystem backend ships; other backends plug in
//! through [`StorageBackend`].

use std::path::{Component, Path, PathBuf};

use crate::{AppError, AppResult};

/// A stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Storage key (relative path).
    pub key: String,
    /// Public URL to access the object.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the content.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an object.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Resolve a key below the base path, rejecting traversal.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || key.is_empty() {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), "Stored object");

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: format!("{:x}", md5::compute(data)),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }
}

/// Generate a storage key for an image owned by `user_id`.
///
/// Keys look like `2025/01/31/<user>/<object>.<ext>`.
#[must_use]
pub fn generate_storage_key(user_id: &str, object_name: &str, extension: &str) -> String {
    let date_path = chrono::Utc::now().format("%Y/%m/%d");
    format!("{date_path}/{user_id}/{object_name}.{extension}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_storage(name: &str) -> (LocalStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("menlog-storage-{name}-{}", std::process::id()));
        (
            LocalStorage::new(dir.clone(), "/files/".to_string()),
            dir,
        )
    }

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("user123", "abc", "jpg");
        assert!(key.contains("/user123/"));
        assert!(key.ends_with("abc.jpg"));
    }

    #[test]
    fn test_public_url_trims_slash() {
        let (storage, _) = temp_storage("url");
        assert_eq!(storage.public_url("a/b.png"), "/files/a/b.png");
    }

    #[tokio::test]
    async fn test_put_exists_delete() {
        let (storage, dir) = temp_storage("roundtrip");

        let stored = storage.put("x/y.png", b"data", "image/png").await.unwrap();
        assert_eq!(stored.size, 4);
        assert_eq!(stored.md5, format!("{:x}", md5::compute(b"data")));
        assert!(storage.exists("x/y.png").await.unwrap());

        storage.delete("x/y.png").await.unwrap();
        assert!(!storage.exists("x/y.png").await.unwrap());
        // Deleting again is fine
        storage.delete("x/y.png").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (storage, _) = temp_storage("traversal");
        let err = storage.put("../escape.png", b"x", "image/png").await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }
}
