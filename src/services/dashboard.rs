use crate::{
    db::DbPool,
    entities::cash_memo::{self, Entity as CashMemoEntity},
    entities::lorry_receipt::{self, Entity as LrEntity},
    entities::memo::{self, Entity as MemoEntity},
    errors::ServiceError,
    ledger,
    services::lorry_receipts::{STATUS_DELIVERED, STATUS_PENDING},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Per-year headline counts for the landing screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub year: i32,
    pub memos: u64,
    pub lrs: u64,
    #[serde(rename = "cashMemos")]
    pub cash_memos: u64,
    pub pending: u64,
    pub delivered: u64,
    #[serde(rename = "pendingTopay")]
    pub pending_topay: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, year: i32) -> Result<DashboardSummary, ServiceError> {
        let memos = MemoEntity::find()
            .filter(memo::Column::FiscalYear.eq(year))
            .count(&*self.db_pool)
            .await?;
        let lrs = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .count(&*self.db_pool)
            .await?;
        let cash_memos = CashMemoEntity::find()
            .filter(cash_memo::Column::FiscalYear.eq(year))
            .count(&*self.db_pool)
            .await?;
        let pending = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::Status.eq(STATUS_PENDING))
            .count(&*self.db_pool)
            .await?;
        let delivered = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::Status.eq(STATUS_DELIVERED))
            .count(&*self.db_pool)
            .await?;
        let pending_topay = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::FreightType.eq(ledger::FREIGHT_TYPE_TOPAY))
            .filter(lorry_receipt::Column::HasCashMemo.eq(false))
            .count(&*self.db_pool)
            .await?;

        Ok(DashboardSummary {
            year,
            memos,
            lrs,
            cash_memos,
            pending,
            delivered,
            pending_topay,
        })
    }
}
