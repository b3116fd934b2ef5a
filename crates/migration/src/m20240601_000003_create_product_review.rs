//! Create `product_review` table.
//! Reviews are append-only; `user_id` is whatever author reference the caller supplied.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240601_000002_create_product::Product;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductReview::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductReview::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(ProductReview::UserId).not_null())
                    .col(big_integer(ProductReview::ProductId).not_null())
                    .col(integer(ProductReview::Rating).not_null())
                    .col(text(ProductReview::Comment).not_null())
                    .col(timestamp_with_time_zone(ProductReview::CreatedAt).not_null())
                    .check(Expr::col(ProductReview::Rating).between(1, 5))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_review_product")
                            .from(ProductReview::Table, ProductReview::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductReview::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum ProductReview {
    Table,
    Id,
    UserId,
    ProductId,
    Rating,
    Comment,
    CreatedAt,
}
