//! Create prefecture badge table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PrefectureBadge::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrefectureBadge::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::Prefecture)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::Tier)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::VisitCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::EarnedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrefectureBadge::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prefecture_badge_user")
                            .from(PrefectureBadge::Table, PrefectureBadge::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, prefecture) - one badge per prefecture
        manager
            .create_index(
                Index::create()
                    .name("idx_prefecture_badge_user_prefecture")
                    .table(PrefectureBadge::Table)
                    .col(PrefectureBadge::UserId)
                    .col(PrefectureBadge::Prefecture)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrefectureBadge::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PrefectureBadge {
    Table,
    Id,
    UserId,
    Prefecture,
    Tier,
    VisitCount,
    EarnedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
