use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery charges collected against one lorry receipt. `cash_memo_no` is
/// issued by the per-year sequence allocator, never chosen by callers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_memos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fiscal_year: i32,
    pub cash_memo_no: i64,
    pub lr_id: i32,
    pub hamali: Decimal,
    pub bc: Decimal,
    pub landing: Decimal,
    pub lc: Decimal,
    pub cash_memo_total: Decimal,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lorry_receipt::Entity",
        from = "Column::LrId",
        to = "super::lorry_receipt::Column::Id"
    )]
    LorryReceipt,
}

impl Related<super::lorry_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LorryReceipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
