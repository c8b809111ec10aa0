//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_shop_table;
mod m20250101_000003_create_image_table;
mod m20250101_000004_create_noodle_table;
mod m20250101_000005_create_like_table;
mod m20250101_000006_create_comment_tables;
mod m20250101_000007_create_notification_table;
mod m20250101_000008_create_prefecture_badge_table;
mod m20250101_000009_create_my_best_table;
mod m20250101_000010_create_feedback_tables;
mod m20250101_000011_create_station_table;

/// Migrator for running all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_shop_table::Migration),
            Box::new(m20250101_000003_create_image_table::Migration),
            Box::new(m20250101_000004_create_noodle_table::Migration),
            Box::new(m20250101_000005_create_like_table::Migration),
            Box::new(m20250101_000006_create_comment_tables::Migration),
            Box::new(m20250101_000007_create_notification_table::Migration),
            Box::new(m20250101_000008_create_prefecture_badge_table::Migration),
            Box::new(m20250101_000009_create_my_best_table::Migration),
            Box::new(m20250101_000010_create_feedback_tables::Migration),
            Box::new(m20250101_000011_create_station_table::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_registered_in_order() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "m20250101_000001_create_user_table");
        assert_eq!(names[10], "m20250101_000011_create_station_table");
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
