//! Seed the reference categories products can be filed under.
use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_category::Category;

const CATEGORIES: [&str; 4] = ["Electronics", "Books", "Fashion", "Home & Living"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Category::Table).columns([Category::Name]);
        for name in CATEGORIES {
            insert.values_panic([name.into()]);
        }
        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Category::Table)
            .and_where(Expr::col(Category::Name).is_in(CATEGORIES))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
