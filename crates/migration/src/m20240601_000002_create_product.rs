//! Create `product` table.
//! `rating` is derived from reviews and starts at 0.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240601_000001_create_category::Category;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Product::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // widths mirror the MAX_*_LEN checks in service::catalog::validation
                    .col(string_len(Product::Sku, 64).not_null())
                    .col(string_len(Product::Title, 256).not_null())
                    .col(text(Product::Description).not_null())
                    .col(big_integer(Product::CategoryId).not_null())
                    .col(string_len(Product::ImageUrl, 512).not_null())
                    .col(integer(Product::Weight).not_null().default(0))
                    .col(big_integer(Product::Price).not_null())
                    .col(double(Product::Rating).not_null().default(0.0))
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Product {
    Table,
    Id,
    Sku,
    Title,
    Description,
    CategoryId,
    ImageUrl,
    Weight,
    Price,
    Rating,
    CreatedAt,
}
