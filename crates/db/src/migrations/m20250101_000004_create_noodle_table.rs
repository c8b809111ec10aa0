//! Create noodle table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Noodle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Noodle::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Noodle::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Noodle::ShopId).string_len(32).not_null())
                    .col(ColumnDef::new(Noodle::RamenName).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Noodle::Genres)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Noodle::VisitDate).date())
                    .col(ColumnDef::new(Noodle::Comment).text())
                    .col(ColumnDef::new(Noodle::Evaluation).small_integer())
                    .col(ColumnDef::new(Noodle::ImageId).string_len(32))
                    .col(
                        ColumnDef::new(Noodle::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Noodle::CommentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Noodle::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Noodle::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noodle_user")
                            .from(Noodle::Table, Noodle::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noodle_shop")
                            .from(Noodle::Table, Noodle::ShopId)
                            .to(Shop::Table, Shop::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noodle_image")
                            .from(Noodle::Table, Noodle::ImageId)
                            .to(Image::Table, Image::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for profile pages and badge recalculation)
        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_user_id")
                    .table(Noodle::Table)
                    .col(Noodle::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_shop_id")
                    .table(Noodle::Table)
                    .col(Noodle::ShopId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for ranking periods)
        manager
            .create_index(
                Index::create()
                    .name("idx_noodle_created_at")
                    .table(Noodle::Table)
                    .col(Noodle::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Noodle::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Noodle {
    Table,
    Id,
    UserId,
    ShopId,
    RamenName,
    Genres,
    VisitDate,
    Comment,
    Evaluation,
    ImageId,
    LikeCount,
    CommentCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Shop {
    Table,
    Id,
}

#[derive(Iden)]
enum Image {
    Table,
    Id,
}
