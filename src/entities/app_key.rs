use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hashed shared secret gating destructive front-office actions. One row per
/// key type; only the argon2 hash is stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub key_type: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
