use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::cash_memo::{self, Entity as CashMemoEntity},
    entities::lorry_receipt::{self, Entity as LrEntity},
    entities::memo::{self, Entity as MemoEntity, Model as MemoModel},
    errors::ServiceError,
    services::audit::{AuditEntry, AuditService},
    services::lorry_receipts::LrDetail,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct MemoPayload {
    #[validate(length(min = 1, max = 50, message = "Memo number is required"))]
    pub memo_no: String,
    pub memo_date: NaiveDate,
    pub arrival_date: NaiveDate,
    pub arrival_time: Option<NaiveTime>,
    #[validate(length(min = 1, max = 50, message = "Truck number is required"))]
    pub truck_no: String,
    pub driver_owner: Option<String>,
    #[serde(default)]
    pub total_lorry_hire: Option<Decimal>,
    #[serde(default)]
    pub advance_lorry_hire: Option<Decimal>,
}

/// Memo row plus the derived balance. The balance is always recomputed from
/// the stored totals, never read back from a column.
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoResponse {
    #[serde(flatten)]
    pub memo: MemoModel,
    pub balance_lorry_hire: Decimal,
}

impl From<MemoModel> for MemoResponse {
    fn from(memo: MemoModel) -> Self {
        let balance = memo.total_lorry_hire - memo.advance_lorry_hire;
        Self {
            memo,
            balance_lorry_hire: balance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemoListPage {
    pub total: u64,
    pub data: Vec<MemoResponse>,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
}

/// Memo with its lorry receipts and their cash memos, as served by the
/// lookup and details endpoints.
#[derive(Debug, Serialize)]
pub struct MemoDetails {
    pub memo: MemoResponse,
    pub lrs: Vec<LrDetail>,
    #[serde(rename = "cashMemos")]
    pub cash_memos: Vec<cash_memo::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemoCascadeSummary {
    pub message: String,
    #[serde(rename = "deletedLrs")]
    pub deleted_lrs: u64,
    #[serde(rename = "deletedCashMemos")]
    pub deleted_cash_memos: u64,
}

#[derive(Clone)]
pub struct MemoService {
    db_pool: Arc<DbPool>,
    audit: AuditService,
}

impl MemoService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditService) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self, payload, actor), fields(memo_no = %payload.memo_no, year))]
    pub async fn create_memo(
        &self,
        year: i32,
        payload: MemoPayload,
        actor: &AuthUser,
    ) -> Result<MemoResponse, ServiceError> {
        payload.validate()?;

        let now = Utc::now();
        let model = memo::ActiveModel {
            fiscal_year: Set(year),
            memo_no: Set(payload.memo_no.trim().to_string()),
            memo_date: Set(payload.memo_date),
            arrival_date: Set(payload.arrival_date),
            arrival_time: Set(payload.arrival_time),
            truck_no: Set(payload.truck_no.trim().to_string()),
            driver_owner: Set(payload.driver_owner),
            total_lorry_hire: Set(payload.total_lorry_hire.unwrap_or_default()),
            advance_lorry_hire: Set(payload.advance_lorry_hire.unwrap_or_default()),
            created_by: Set(Some(actor.username.clone())),
            created_at: Set(now),
            ..Default::default()
        };

        let memo_no = payload.memo_no.trim().to_string();
        let inserted = model
            .insert(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("Memo {}", memo_no)))?;

        info!(memo_id = inserted.id, "memo created");

        self.audit
            .record(
                AuditEntry::new(&actor.username, "create", "memo")
                    .entity_no(&inserted.memo_no)
                    .year(year)
                    .new_data(serde_json::to_value(&inserted).unwrap_or_default()),
            )
            .await;

        Ok(inserted.into())
    }

    /// Full-row replace keeping creation audit columns intact.
    #[instrument(skip(self, payload, actor), fields(memo_id = id))]
    pub async fn update_memo(
        &self,
        year: i32,
        id: i32,
        payload: MemoPayload,
        actor: &AuthUser,
    ) -> Result<MemoResponse, ServiceError> {
        payload.validate()?;

        let existing = self.find_in_year(year, id).await?;
        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

        let mut model: memo::ActiveModel = existing.into();
        model.memo_no = Set(payload.memo_no.trim().to_string());
        model.memo_date = Set(payload.memo_date);
        model.arrival_date = Set(payload.arrival_date);
        model.arrival_time = Set(payload.arrival_time);
        model.truck_no = Set(payload.truck_no.trim().to_string());
        model.driver_owner = Set(payload.driver_owner);
        model.total_lorry_hire = Set(payload.total_lorry_hire.unwrap_or_default());
        model.advance_lorry_hire = Set(payload.advance_lorry_hire.unwrap_or_default());
        model.updated_by = Set(Some(actor.username.clone()));
        model.updated_at = Set(Some(Utc::now()));

        let memo_no = payload.memo_no.trim().to_string();
        let updated = model
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("Memo {}", memo_no)))?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "memo")
                    .entity_no(&updated.memo_no)
                    .year(year)
                    .old_data(old_snapshot)
                    .new_data(serde_json::to_value(&updated).unwrap_or_default()),
            )
            .await;

        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn get_memo(&self, year: i32, id: i32) -> Result<MemoResponse, ServiceError> {
        Ok(self.find_in_year(year, id).await?.into())
    }

    /// All memos for a year, newest arrival first.
    #[instrument(skip(self))]
    pub async fn list_memos(&self, year: i32) -> Result<Vec<MemoResponse>, ServiceError> {
        let memos = MemoEntity::find()
            .filter(memo::Column::FiscalYear.eq(year))
            .order_by_desc(memo::Column::ArrivalDate)
            .order_by_desc(memo::Column::Id)
            .all(&*self.db_pool)
            .await?;

        Ok(memos.into_iter().map(Into::into).collect())
    }

    /// Paginated listing with optional memo number search.
    #[instrument(skip(self))]
    pub async fn list_memos_paged(
        &self,
        year: i32,
        page: u64,
        page_size: u64,
        search: Option<String>,
        ascending: bool,
    ) -> Result<MemoListPage, ServiceError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut query = MemoEntity::find().filter(memo::Column::FiscalYear.eq(year));

        if let Some(needle) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(memo::Column::MemoNo.contains(needle));
        }

        query = if ascending {
            query.order_by_asc(memo::Column::MemoDate).order_by_asc(memo::Column::Id)
        } else {
            query.order_by_desc(memo::Column::MemoDate).order_by_desc(memo::Column::Id)
        };

        let paginator = query.paginate(&*self.db_pool, page_size);
        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(page - 1)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(MemoListPage {
            total,
            data,
            page,
            page_size,
        })
    }

    /// Memo details looked up by business number.
    #[instrument(skip(self))]
    pub async fn lookup_memo(&self, year: i32, memo_no: &str) -> Result<MemoDetails, ServiceError> {
        let memo = MemoEntity::find()
            .filter(memo::Column::FiscalYear.eq(year))
            .filter(memo::Column::MemoNo.eq(memo_no.trim()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Memo {}", memo_no)))?;

        self.assemble_details(memo).await
    }

    /// Memo details looked up by row id.
    #[instrument(skip(self))]
    pub async fn memo_details(&self, year: i32, id: i32) -> Result<MemoDetails, ServiceError> {
        let memo = self.find_in_year(year, id).await?;
        self.assemble_details(memo).await
    }

    /// Deletes the memo and everything referencing it: cash memos first,
    /// then lorry receipts, then the memo itself, in one transaction.
    #[instrument(skip(self, actor), fields(memo_id = id))]
    pub async fn delete_memo(
        &self,
        year: i32,
        id: i32,
        actor: &AuthUser,
    ) -> Result<MemoCascadeSummary, ServiceError> {
        let memo = self.find_in_year(year, id).await?;
        let snapshot = serde_json::to_value(&memo).unwrap_or_default();

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to start memo delete transaction");
            ServiceError::DatabaseError(e)
        })?;

        let lrs = LrEntity::find()
            .filter(lorry_receipt::Column::MemoId.eq(memo.id))
            .all(&txn)
            .await?;
        let lr_ids: Vec<i32> = lrs.iter().map(|lr| lr.id).collect();

        let deleted_cash_memos = if lr_ids.is_empty() {
            0
        } else {
            CashMemoEntity::delete_many()
                .filter(cash_memo::Column::LrId.is_in(lr_ids.clone()))
                .exec(&txn)
                .await?
                .rows_affected
        };

        let deleted_lrs = LrEntity::delete_many()
            .filter(lorry_receipt::Column::MemoId.eq(memo.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let memo_no = memo.memo_no.clone();
        memo.delete(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            deleted_lrs,
            deleted_cash_memos, "memo cascade delete finished"
        );

        self.audit
            .record(
                AuditEntry::new(&actor.username, "delete", "memo")
                    .entity_no(&memo_no)
                    .year(year)
                    .old_data(snapshot)
                    .details(format!(
                        "cascade removed {} LRs and {} cash memos",
                        deleted_lrs, deleted_cash_memos
                    )),
            )
            .await;

        Ok(MemoCascadeSummary {
            message: "Memo and related records deleted".to_string(),
            deleted_lrs,
            deleted_cash_memos,
        })
    }

    async fn find_in_year(&self, year: i32, id: i32) -> Result<MemoModel, ServiceError> {
        MemoEntity::find_by_id(id)
            .filter(memo::Column::FiscalYear.eq(year))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Memo".to_string()))
    }

    async fn assemble_details(&self, memo: MemoModel) -> Result<MemoDetails, ServiceError> {
        let lrs = LrEntity::find()
            .filter(lorry_receipt::Column::MemoId.eq(memo.id))
            .order_by_asc(lorry_receipt::Column::LrNo)
            .find_also_related(CashMemoEntity)
            .all(&*self.db_pool)
            .await?;

        let cash_memos: Vec<cash_memo::Model> = lrs
            .iter()
            .filter_map(|(_, cm)| cm.clone())
            .collect();

        let lr_details = lrs
            .into_iter()
            .map(|(lr, cm)| LrDetail::assemble(lr, cm))
            .collect();

        Ok(MemoDetails {
            memo: memo.into(),
            lrs: lr_details,
            cash_memos,
        })
    }
}
