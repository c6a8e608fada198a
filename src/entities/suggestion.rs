use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Autocomplete values shared across years. `kind` is one of the
/// [`crate::services::suggestions::SuggestionKind`] variants.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suggestions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
