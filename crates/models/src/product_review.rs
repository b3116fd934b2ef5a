use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, FromQueryResult, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::{errors, product};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Aggregate row over one product's reviews.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct StatisticRow {
    pub count: i64,
    pub average: f64,
}

/// Count and mean rating of a product's reviews.
/// Grouped by product, so a product without reviews yields no row.
pub async fn statistic(db: &DatabaseConnection, product_id: i64) -> Result<Option<StatisticRow>, errors::ModelError> {
    Ok(Entity::find()
        .select_only()
        .column_as(Expr::cust("COUNT(id)"), "count")
        .column_as(Expr::cust("CAST(AVG(rating) AS DOUBLE PRECISION)"), "average")
        .filter(Column::ProductId.eq(product_id))
        .group_by(Column::ProductId)
        .into_model::<StatisticRow>()
        .one(db)
        .await?)
}
