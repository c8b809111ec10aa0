//! "My best" picks: one favourite noodle per user-defined category.

use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{
    entities::my_best,
    repositories::{MyBestRepository, NoodleRepository},
};
use sea_orm::Set;

const MAX_CATEGORY_CHARS: usize = 30;

/// My-best service for business logic.
#[derive(Clone)]
pub struct MyBestService {
    my_best_repo: MyBestRepository,
    noodle_repo: NoodleRepository,
    id_gen: IdGenerator,
}

impl MyBestService {
    /// Create a new my-best service.
    #[must_use]
    pub const fn new(my_best_repo: MyBestRepository, noodle_repo: NoodleRepository) -> Self {
        Self {
            my_best_repo,
            noodle_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Pick a noodle for a category, replacing any earlier pick.
    pub async fn set(
        &self,
        user_id: &str,
        category: &str,
        noodle_id: &str,
    ) -> AppResult<my_best::Model> {
        let category = normalize_category(category)?;

        let noodle = self.noodle_repo.get_by_id(noodle_id).await?;
        if noodle.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only your own noodles can be picked".to_string(),
            ));
        }

        if let Some(existing) = self
            .my_best_repo
            .find_by_user_and_category(user_id, &category)
            .await?
        {
            if existing.noodle_id == noodle.id {
                return Ok(existing);
            }
            let mut active: my_best::ActiveModel = existing.into();
            active.noodle_id = Set(noodle.id);
            return self.my_best_repo.update(active).await;
        }

        let model = my_best::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            category: Set(category),
            noodle_id: Set(noodle.id),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.my_best_repo.create(model).await
    }

    /// Clear a category.
    pub async fn remove(&self, user_id: &str, category: &str) -> AppResult<()> {
        let category = normalize_category(category)?;
        if self
            .my_best_repo
            .delete_by_user_and_category(user_id, &category)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("My best: {category}")))
        }
    }

    /// A user's picks.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<my_best::Model>> {
        self.my_best_repo.find_by_user(user_id).await
    }
}

fn normalize_category(category: &str) -> AppResult<String> {
    let trimmed = category.trim();
    let chars = trimmed.chars().count();
    if chars == 0 || chars > MAX_CATEGORY_CHARS {
        return Err(AppError::Validation(format!(
            "Category must be 1-{MAX_CATEGORY_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
