//! Create noodle like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NoodleLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NoodleLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NoodleLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(NoodleLike::NoodleId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(NoodleLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noodle_like_user")
                            .from(NoodleLike::Table, NoodleLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noodle_like_noodle")
                            .from(NoodleLike::Table, NoodleLike::NoodleId)
                            .to(Noodle::Table, Noodle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, noodle_id) - one like per user per noodle
        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_like_user_noodle")
                    .table(NoodleLike::Table)
                    .col(NoodleLike::UserId)
                    .col(NoodleLike::NoodleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_like_noodle_id")
                    .table(NoodleLike::Table)
                    .col(NoodleLike::NoodleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_like_created_at")
                    .table(NoodleLike::Table)
                    .col(NoodleLike::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoodleLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NoodleLike {
    Table,
    Id,
    UserId,
    NoodleId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Noodle {
    Table,
    Id,
}
