//! Create my best table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MyBest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MyBest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MyBest::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(MyBest::Category).string_len(64).not_null())
                    .col(ColumnDef::new(MyBest::NoodleId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(MyBest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_my_best_user")
                            .from(MyBest::Table, MyBest::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_my_best_noodle")
                            .from(MyBest::Table, MyBest::NoodleId)
                            .to(Noodle::Table, Noodle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, category)
        manager
            .create_index(
                Index::create()
                    .name("idx_my_best_user_category")
                    .table(MyBest::Table)
                    .col(MyBest::UserId)
                    .col(MyBest::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MyBest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MyBest {
    Table,
    Id,
    UserId,
    Category,
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
