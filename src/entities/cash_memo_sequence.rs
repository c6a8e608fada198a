use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-year counter backing cash memo numbering. Rows are only ever touched
/// inside a transaction by the sequence service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_memo_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub fiscal_year: i32,
    pub last_no: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
