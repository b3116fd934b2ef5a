use sea_orm::{entity::prelude::*, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::{category, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub sku: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category_id: i64,
    pub image_url: String,
    pub weight: i32,
    pub price: i64,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Category,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Load a product together with its category row.
pub async fn find_with_category(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<(Model, Option<category::Model>)>, errors::ModelError> {
    Ok(Entity::find_by_id(id).find_also_related(category::Entity).one(db).await?)
}

pub async fn find_by_sku(db: &DatabaseConnection, sku: &str) -> Result<Option<(Model, Option<category::Model>)>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::Sku.eq(sku))
        .find_also_related(category::Entity)
        .one(db)
        .await?)
}
