use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One consignment travelling under a memo. `has_cash_memo` mirrors the
/// existence of a cash memo row and is maintained by the cash memo service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lorry_receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fiscal_year: i32,
    pub memo_id: i32,
    pub lr_no: String,
    pub lr_date: NaiveDate,
    pub from_city: String,
    pub to_city: String,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub pkgs: Option<i32>,
    pub content: Option<String>,
    pub freight_type: String,
    pub freight: Decimal,
    pub weight: Option<Decimal>,
    pub dd_rate: Option<Decimal>,
    pub dd_total: Option<Decimal>,
    pub pm_no: Option<String>,
    pub refund: Decimal,
    pub remarks: Option<String>,
    pub status: String,
    pub has_cash_memo: bool,
    pub delivered_by: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::memo::Entity",
        from = "Column::MemoId",
        to = "super::memo::Column::Id"
    )]
    Memo,
    #[sea_orm(has_one = "super::cash_memo::Entity")]
    CashMemo,
}

impl Related<super::memo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memo.def()
    }
}

impl Related<super::cash_memo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashMemo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
