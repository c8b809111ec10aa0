//! Create feedback and feedback steam tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedback::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedback::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Feedback::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Feedback::Message).text().not_null())
                    .col(ColumnDef::new(Feedback::HeatLevel).small_integer().not_null())
                    .col(
                        ColumnDef::new(Feedback::SteamCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_user")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_steam_count")
                    .table(Feedback::Table)
                    .col(Feedback::SteamCount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FeedbackSteam::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbackSteam::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSteam::FeedbackId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSteam::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSteam::HeatLevel)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSteam::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_steam_feedback")
                            .from(FeedbackSteam::Table, FeedbackSteam::FeedbackId)
                            .to(Feedback::Table, Feedback::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_steam_user")
                            .from(FeedbackSteam::Table, FeedbackSteam::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, feedback_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_steam_user_feedback")
                    .table(FeedbackSteam::Table)
                    .col(FeedbackSteam::UserId)
                    .col(FeedbackSteam::FeedbackId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbackSteam::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    UserId,
    Category,
    Message,
    HeatLevel,
    SteamCount,
    CreatedAt,
}

#[derive(Iden)]
enum FeedbackSteam {
    Table,
    Id,
    FeedbackId,
    UserId,
    HeatLevel,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
