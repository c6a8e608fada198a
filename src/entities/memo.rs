use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Arrival memo for one truck load. A memo groups the lorry receipts that
/// travelled on the same vehicle.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fiscal_year: i32,
    pub memo_no: String,
    pub memo_date: NaiveDate,
    pub arrival_date: NaiveDate,
    pub arrival_time: Option<NaiveTime>,
    pub truck_no: String,
    pub driver_owner: Option<String>,
    pub total_lorry_hire: Decimal,
    pub advance_lorry_hire: Decimal,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lorry_receipt::Entity")]
    LorryReceipt,
}

impl Related<super::lorry_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LorryReceipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
