use chrono::Utc;
use models::{category, product, product_review};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet, Order, QueryFilter, QueryOrder, QuerySelect, Set};
use tracing::debug;

use crate::catalog::domain::{
    Category, NewProduct, NewReview, Product, ProductChanges, ProductQuery, SortColumn, SortType, Statistic,
};
use crate::catalog::repository::{CategoryRepository, ProductRepository, ReviewRepository};
use crate::errors::RepositoryError;

/// Postgres-backed implementation of all three catalog repositories.
#[derive(Clone)]
pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

fn to_product(row: product::Model, category: Option<category::Model>) -> Product {
    let category = category
        .map(|c| Category { id: c.id, name: c.name })
        .unwrap_or(Category { id: row.category_id, name: String::new() });
    Product {
        id: row.id,
        sku: row.sku,
        title: row.title,
        description: row.description,
        category,
        image_url: row.image_url,
        weight: row.weight,
        price: row.price,
        rating: row.rating,
        created_at: row.created_at.with_timezone(&Utc),
    }
}

fn sort_column(column: SortColumn) -> product::Column {
    match column {
        SortColumn::CreatedAt => product::Column::CreatedAt,
        SortColumn::Rating => product::Column::Rating,
    }
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmCatalogRepository {
    async fn get_product(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let res = product::find_with_category(&self.db, id).await?;
        Ok(res.map(|(p, c)| to_product(p, c)))
    }

    async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let res = product::find_by_sku(&self.db, sku).await?;
        Ok(res.map(|(p, c)| to_product(p, c)))
    }

    async fn get_product_list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut select = product::Entity::find().find_also_related(category::Entity);
        if !query.search.is_empty() {
            select = select.filter(
                Condition::any()
                    .add(product::Column::Title.contains(&query.search))
                    .add(product::Column::Sku.contains(&query.search)),
            );
        }
        if query.category_id > 0 {
            select = select.filter(product::Column::CategoryId.eq(query.category_id));
        }
        if let Some(column) = query.sort_column {
            let order = match query.sort_type.unwrap_or_default() {
                SortType::Asc => Order::Asc,
                SortType::Desc => Order::Desc,
            };
            select = select.order_by(sort_column(column), order);
        }
        let rows = select
            .limit(query.limit.max(0) as u64)
            .offset(query.offset.max(0) as u64)
            .all(&self.db)
            .await?;
        debug!(count = rows.len(), "product list fetched");
        Ok(rows.into_iter().map(|(p, c)| to_product(p, c)).collect())
    }

    async fn insert_product(&self, new: NewProduct) -> Result<(), RepositoryError> {
        let am = product::ActiveModel {
            id: NotSet,
            sku: Set(new.sku),
            title: Set(new.title),
            description: Set(new.description),
            category_id: Set(new.category_id),
            image_url: Set(new.image_url),
            weight: Set(new.weight),
            price: Set(new.price),
            rating: Set(new.rating),
            created_at: Set(new.created_at.into()),
        };
        product::Entity::insert(am).exec(&self.db).await?;
        Ok(())
    }

    async fn update_product(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError> {
        let res = product::Entity::update_many()
            .col_expr(product::Column::Sku, Expr::value(changes.sku))
            .col_expr(product::Column::Title, Expr::value(changes.title))
            .col_expr(product::Column::Description, Expr::value(changes.description))
            .col_expr(product::Column::CategoryId, Expr::value(changes.category_id))
            .filter(product::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_product_rating(&self, id: i64, rating: f64) -> Result<(), RepositoryError> {
        product::Entity::update_many()
            .col_expr(product::Column::Rating, Expr::value(rating))
            .filter(product::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCatalogRepository {
    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
        let res = category::Entity::find_by_id(id).one(&self.db).await?;
        Ok(res.map(|c| Category { id: c.id, name: c.name }))
    }
}

#[async_trait::async_trait]
impl ReviewRepository for SeaOrmCatalogRepository {
    async fn insert_review(&self, review: NewReview) -> Result<(), RepositoryError> {
        let am = product_review::ActiveModel {
            id: NotSet,
            user_id: Set(review.author.0),
            product_id: Set(review.product_id),
            rating: Set(review.rating),
            comment: Set(review.comment),
            created_at: Set(Utc::now().into()),
        };
        product_review::Entity::insert(am).exec(&self.db).await?;
        Ok(())
    }

    async fn get_review_statistic(&self, product_id: i64) -> Result<Option<Statistic>, RepositoryError> {
        let row = product_review::statistic(&self.db, product_id).await?;
        Ok(row.map(|s| Statistic { count: s.count, average: s.average }))
    }
}
