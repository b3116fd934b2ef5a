use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a category. Categories are reference data; the catalog service never calls this.
pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    let am = ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    };
    Ok(am.insert(db).await?)
}
