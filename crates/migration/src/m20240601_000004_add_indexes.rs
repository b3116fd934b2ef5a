use sea_orm_migration::prelude::*;

use crate::m20240601_000002_create_product::Product;
use crate::m20240601_000003_create_product_review::ProductReview;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product: SKU is unique across the catalog
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_sku")
                    .table(Product::Table)
                    .col(Product::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Product: category filter on listing
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ProductReview: statistic aggregation per product
        manager
            .create_index(
                Index::create()
                    .name("idx_product_review_product")
                    .table(ProductReview::Table)
                    .col(ProductReview::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_review_product").table(ProductReview::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_category").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_product_sku").table(Product::Table).to_owned())
            .await
    }
}
