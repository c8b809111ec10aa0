//! Create shop table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shop::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shop::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shop::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Shop::Address).string_len(256).not_null())
                    .col(ColumnDef::new(Shop::Url).string_len(1024))
                    .col(ColumnDef::new(Shop::Prefecture).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Shop::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shop_prefecture")
                    .table(Shop::Table)
                    .col(Shop::Prefecture)
                    .to_owned(),
            )
            .await?;

        // Shops are deduplicated by (name, address)
        manager
            .create_index(
                Index::create()
                    .name("idx_shop_name_address")
                    .table(Shop::Table)
                    .col(Shop::Name)
                    .col(Shop::Address)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shop::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shop {
    Table,
    Id,
    Name,
    Address,
    Url,
    Prefecture,
    CreatedAt,
}
