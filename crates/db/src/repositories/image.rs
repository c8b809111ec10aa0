//! Image repository.

use std::sync::Arc;

use crate::entities::{Image, image};
use menlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};

/// Image repository for database operations.
#[derive(Clone)]
pub struct ImageRepository {
    db: Arc<DatabaseConnection>,
}

impl ImageRepository {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an image by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<image::Model>> {
        Image::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an image by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<image::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image: {id}")))
    }

    /// Find images by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<image::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Image::find()
            .filter(image::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record an uploaded image.
    pub async fn create(&self, model: image::ActiveModel) -> AppResult<image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an image row. Noodles referencing it keep existing with no image.
    pub async fn delete(&self, model: image::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
