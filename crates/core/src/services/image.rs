//! Image uploads for noodle photos.

use std::sync::Arc;

use ::image::ImageFormat;
use menlog_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use menlog_db::{entities::image, repositories::ImageRepository};
use sea_orm::Set;
use tracing::{info, warn};

/// Accepted image formats with their MIME type and file extension.
fn accepted_format(data: &[u8]) -> Option<(&'static str, &'static str)> {
    match ::image::guess_format(data).ok()? {
        ImageFormat::Jpeg => Some(("image/jpeg", "jpg")),
        ImageFormat::Png => Some(("image/png", "png")),
        ImageFormat::Gif => Some(("image/gif", "gif")),
        ImageFormat::WebP => Some(("image/webp", "webp")),
        _ => None,
    }
}

/// Image service for business logic.
#[derive(Clone)]
pub struct ImageService {
    image_repo: ImageRepository,
    storage: Arc<dyn StorageBackend>,
    max_upload_bytes: usize,
    id_gen: IdGenerator,
}

impl ImageService {
    /// Create a new image service.
    #[must_use]
    pub fn new(
        image_repo: ImageRepository,
        storage: Arc<dyn StorageBackend>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            image_repo,
            storage,
            max_upload_bytes,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store an uploaded image and record it.
    ///
    /// The format is sniffed from the bytes; the declared content type only
    /// has to claim an image.
    pub async fn upload(
        &self,
        user_id: &str,
        file_name: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<image::Model> {
        if data.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds {} bytes",
                self.max_upload_bytes
            )));
        }
        if let Some(declared) = content_type
            && !declared.starts_with("image/")
        {
            return Err(AppError::Validation(format!(
                "Unsupported content type: {declared}"
            )));
        }

        let (mime, extension) = accepted_format(data).ok_or_else(|| {
            AppError::Validation("Only JPEG, PNG, GIF and WebP images are accepted".to_string())
        })?;

        let id = self.id_gen.generate();
        let key = generate_storage_key(user_id, &self.id_gen.generate_object_name(), extension);
        let stored = self.storage.put(&key, data, mime).await?;

        let model = image::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            storage_key: Set(stored.key.clone()),
            url: Set(stored.url),
            content_type: Set(stored.content_type),
            size: Set(i64::try_from(stored.size).unwrap_or(i64::MAX)),
            md5: Set(stored.md5),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.image_repo.create(model).await {
            Ok(created) => {
                info!(
                    image_id = %created.id,
                    user_id = %user_id,
                    file_name = file_name.unwrap_or(""),
                    size = created.size,
                    "Image uploaded"
                );
                Ok(created)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    /// Image metadata.
    pub async fn get(&self, image_id: &str) -> AppResult<image::Model> {
        self.image_repo.get_by_id(image_id).await
    }

    /// Current public URL of an image, which may differ from the one stored
    /// at upload time if the storage URL changed since.
    #[must_use]
    pub fn public_url(&self, image: &image::Model) -> String {
        self.storage.public_url(&image.storage_key)
    }

    /// Delete an image (uploader only). Noodles using it lose the reference.
    pub async fn delete(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        let image = self.image_repo.get_by_id(image_id).await?;
        if image.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the uploader can delete this image".to_string(),
            ));
        }

        let key = image.storage_key.clone();
        self.image_repo.delete(image).await?;

        if let Err(e) = self.storage.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to delete image from storage");
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use menlog_common::StoredObject;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[derive(Default)]
    struct MemoryStorage {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for MemoryStorage {
        async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_vec());
            Ok(StoredObject {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: format!("{:x}", md5::compute(data)),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/files/{key}")
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.objects.lock().unwrap().contains_key(key))
        }
    }

    fn create_test_image(user_id: &str) -> image::Model {
        image::Model {
            id: "img1".to_string(),
            user_id: user_id.to_string(),
            storage_key: "2025/01/01/user1/abc.png".to_string(),
            url: "/files/2025/01/01/user1/abc.png".to_string(),
            content_type: "image/png".to_string(),
            size: PNG_HEADER.len() as i64,
            md5: format!("{:x}", md5::compute(PNG_HEADER)),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection, storage: Arc<MemoryStorage>) -> ImageService {
        ImageService::new(ImageRepository::new(Arc::new(db)), storage, 1024)
    }

    #[test]
    fn test_accepted_format() {
        assert_eq!(accepted_format(PNG_HEADER), Some(("image/png", "png")));
        assert_eq!(accepted_format(JPEG_HEADER), Some(("image/jpeg", "jpg")));
        assert_eq!(accepted_format(b"GIF89a......"), Some(("image/gif", "gif")));
        assert_eq!(accepted_format(b"BM\0\0\0\0\0\0\0\0"), None);
        assert_eq!(accepted_format(b"plain text"), None);
    }

    #[test]
    fn test_public_url_follows_storage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut image = create_test_image("user1");
        image.url = "https://old-cdn.example/abc.png".to_string();

        let url = service(db, Arc::new(MemoryStorage::default())).public_url(&image);

        assert_eq!(url, "/files/2025/01/01/user1/abc.png");
    }

    #[tokio::test]
    async fn test_upload_stores_and_records() {
        let storage = Arc::new(MemoryStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_image("user1")]])
            .into_connection();

        let image = service(db, storage.clone())
            .upload("user1", Some("ramen.png"), Some("image/png"), PNG_HEADER)
            .await
            .unwrap();

        assert_eq!(image.id, "img1");
        assert_eq!(storage.objects.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let storage = Arc::new(MemoryStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, storage.clone())
            .upload("user1", Some("notes.txt"), None, b"hello world")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized() {
        let mut data = PNG_HEADER.to_vec();
        data.resize(2048, 0);
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, Arc::new(MemoryStorage::default()))
            .upload("user1", None, Some("image/png"), &data)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failed_insert_removes_stored_file() {
        let storage = Arc::new(MemoryStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, storage.clone())
            .upload("user1", None, Some("image/png"), PNG_HEADER)
            .await;

        assert!(result.is_err());
        assert!(storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_non_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_image("user1")]])
            .into_connection();

        let result = service(db, Arc::new(MemoryStorage::default()))
            .delete("intruder", "img1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_image("user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = service(db, Arc::new(MemoryStorage::default()))
            .delete("user1", "img1")
            .await;

        assert!(result.is_ok());
    }
}
