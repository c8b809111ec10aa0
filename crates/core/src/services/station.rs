//! Station service: nearest-station suggestions ranked by use.

use menlog_common::{AppError, AppResult, IdGenerator};
use menlog_db::{entities::station, repositories::StationRepository};
use sea_orm::Set;
use tracing::debug;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 50;

/// Station service for business logic.
#[derive(Clone)]
pub struct StationService {
    station_repo: StationRepository,
    id_gen: IdGenerator,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl StationService {
    /// Create a new station service.
    #[must_use]
    pub const fn new(station_repo: StationRepository) -> Self {
        Self {
            station_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record that a station was used, creating it on first use.
    pub async fn use_station(
        &self,
        name: &str,
        prefecture: Option<String>,
        line: Option<String>,
    ) -> AppResult<station::Model> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(AppError::Validation(
                "Station name must be 1-100 characters".to_string(),
            ));
        }
        let prefecture = non_blank(prefecture);
        let line = non_blank(line);

        if let Some(existing) = self.station_repo.find_by_name(name).await? {
            return self
                .station_repo
                .record_use(&existing.id, prefecture, line)
                .await;
        }

        let now = chrono::Utc::now();
        let model = station::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            prefecture: Set(prefecture.clone()),
            line: Set(line.clone()),
            usage_count: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match self.station_repo.create(model).await {
            Err(AppError::Conflict(_)) => {
                // Lost an insert race; count this use against the winner.
                debug!(name = %name, "Station created concurrently");
                let existing = self
                    .station_repo
                    .find_by_name(name)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Station: {name}")))?;
                self.station_repo
                    .record_use(&existing.id, prefecture, line)
                    .await
            }
            other => other,
        }
    }

    /// Stations whose name starts with `prefix`, most used first.
    pub async fn search(&self, prefix: &str, limit: Option<u64>) -> AppResult<Vec<station::Model>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(vec![]);
        }
        self.station_repo
            .search_prefix(prefix, limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT))
            .await
    }

    /// Most used stations.
    pub async fn popular(&self, limit: Option<u64>) -> AppResult<Vec<station::Model>> {
        self.station_repo
            .find_popular(limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_station(usage_count: i32, line: Option<&str>) -> station::Model {
        station::Model {
            id: "st1".to_string(),
            name: "新宿".to_string(),
            prefecture: Some("東京都".to_string()),
            line: line.map(str::to_string),
            usage_count,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" 山手線 ".to_string())), Some("山手線".to_string()));
        assert_eq!(non_blank(None), None);
    }

    #[tokio::test]
    async fn test_first_use_creates_station() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<station::Model>::new()])
            .append_query_results([[create_test_station(1, None)]])
            .into_connection();
        let service = StationService::new(StationRepository::new(Arc::new(db)));

        let station = service.use_station(" 新宿 ", None, None).await.unwrap();

        assert_eq!(station.usage_count, 1);
    }

    #[tokio::test]
    async fn test_repeat_use_increments() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_station(4, None)]])
            .append_query_results([[create_test_station(5, Some("山手線"))]])
            .into_connection();
        let service = StationService::new(StationRepository::new(Arc::new(db)));

        let station = service
            .use_station("新宿", None, Some("山手線".to_string()))
            .await
            .unwrap();

        assert_eq!(station.usage_count, 5);
        assert_eq!(station.line.as_deref(), Some("山手線"));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let service = StationService::new(StationRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )));

        let result = service.use_station("  ", None, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_search_skips_query() {
        let service = StationService::new(StationRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )));

        assert!(service.search(" ", None).await.unwrap().is_empty());
    }
}
