use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only trail of mutating operations. `old_data` and `new_data` carry
/// JSON row snapshots; `details` keeps the legacy free-text description.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user: String,
    pub action: String,
    pub entity: String,
    pub entity_no: Option<String>,
    pub year: Option<i32>,
    pub old_data: Option<Json>,
    pub new_data: Option<Json>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
