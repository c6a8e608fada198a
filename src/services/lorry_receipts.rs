use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::cash_memo::{self, Entity as CashMemoEntity, Model as CashMemoModel},
    entities::lorry_receipt::{self, Entity as LrEntity, Model as LrModel},
    entities::memo::{self, Entity as MemoEntity, Model as MemoModel},
    errors::ServiceError,
    ledger,
    services::audit::{AuditEntry, AuditService},
    services::cash_memos::CashMemoDetail,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_DELIVERED: &str = "Delivered";

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LrPayload {
    pub memo_id: i32,
    #[validate(length(min = 1, max = 50, message = "L.R. number is required"))]
    pub lr_no: String,
    pub lr_date: NaiveDate,
    #[validate(length(min = 1, message = "Origin city is required"))]
    pub from_city: String,
    #[validate(length(min = 1, message = "Destination city is required"))]
    pub to_city: String,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub pkgs: Option<i32>,
    pub content: Option<String>,
    #[serde(default = "default_freight_type")]
    pub freight_type: String,
    #[serde(default)]
    pub freight: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub dd_rate: Option<Decimal>,
    pub dd_total: Option<Decimal>,
    pub pm_no: Option<String>,
    #[serde(default)]
    pub refund: Option<Decimal>,
    pub remarks: Option<String>,
}

fn default_freight_type() -> String {
    ledger::FREIGHT_TYPE_TOPAY.to_string()
}

/// Lorry receipt with its cash memo nested, the shape embedded in memo
/// details and LR reads.
#[derive(Debug, Serialize)]
pub struct LrDetail {
    #[serde(flatten)]
    pub lr: LrModel,
    #[serde(rename = "cashMemo")]
    pub cash_memo: Option<CashMemoDetail>,
}

impl LrDetail {
    /// Builds the read-path view: nested cash memo with its recomputed
    /// total, and a dd_total derived when not stored.
    pub fn assemble(mut lr: LrModel, cash_memo: Option<CashMemoModel>) -> Self {
        lr.dd_total = ledger::dd_total(lr.dd_rate, lr.pkgs, lr.dd_total);
        let cash_memo =
            cash_memo.map(|cm| CashMemoDetail::compute(cm, lr.freight, &lr.freight_type));
        Self { lr, cash_memo }
    }
}

/// `{lr, cashMemo}` pair served by the by-number lookups.
#[derive(Debug, Serialize)]
pub struct LrCashMemoPair {
    pub lr: LrModel,
    #[serde(rename = "cashMemo")]
    pub cash_memo: Option<CashMemoDetail>,
}

/// LR plus its memo, served by the id details endpoint.
#[derive(Debug, Serialize)]
pub struct LrFullDetails {
    pub lr: LrDetail,
    pub memo: Option<MemoModel>,
}

/// Search row: receipt detail plus the joined memo columns the search
/// listing shows.
#[derive(Debug, Serialize)]
pub struct LrSearchRow {
    #[serde(flatten)]
    pub detail: LrDetail,
    pub memo_no: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub truck_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LrSearchPage {
    pub results: Vec<LrSearchRow>,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LrSearchFilters {
    pub lr_no: Option<String>,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub status: Option<String>,
    pub lr_date_from: Option<NaiveDate>,
    pub lr_date_to: Option<NaiveDate>,
    pub memo_date_from: Option<NaiveDate>,
    pub memo_date_to: Option<NaiveDate>,
    pub arrival_date_from: Option<NaiveDate>,
    pub arrival_date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkDeliveredRequest {
    pub lr_ids: Vec<i32>,
    pub delivered_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkDeliveredSummary {
    pub updated: u64,
    pub total: u64,
}

#[derive(Clone)]
pub struct LrService {
    db_pool: Arc<DbPool>,
    audit: AuditService,
}

impl LrService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditService) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self, payload, actor), fields(lr_no = %payload.lr_no, year))]
    pub async fn create_lr(
        &self,
        year: i32,
        payload: LrPayload,
        actor: &AuthUser,
    ) -> Result<LrModel, ServiceError> {
        payload.validate()?;

        let memo = MemoEntity::find_by_id(payload.memo_id)
            .filter(memo::Column::FiscalYear.eq(year))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::BadRequest("Invalid memo for L.R.".to_string()))?;

        let dd_total = ledger::dd_total(payload.dd_rate, payload.pkgs, payload.dd_total);
        let now = Utc::now();
        let lr_no = payload.lr_no.trim().to_string();

        let model = lorry_receipt::ActiveModel {
            fiscal_year: Set(year),
            memo_id: Set(memo.id),
            lr_no: Set(lr_no.clone()),
            lr_date: Set(payload.lr_date),
            from_city: Set(payload.from_city.trim().to_string()),
            to_city: Set(payload.to_city.trim().to_string()),
            consignor: Set(payload.consignor),
            consignee: Set(payload.consignee),
            pkgs: Set(payload.pkgs),
            content: Set(payload.content),
            freight_type: Set(payload.freight_type),
            freight: Set(payload.freight.unwrap_or_default()),
            weight: Set(payload.weight),
            dd_rate: Set(payload.dd_rate),
            dd_total: Set(dd_total),
            pm_no: Set(payload.pm_no),
            refund: Set(payload.refund.unwrap_or_default()),
            remarks: Set(payload.remarks),
            status: Set(STATUS_PENDING.to_string()),
            has_cash_memo: Set(false),
            created_by: Set(Some(actor.username.clone())),
            created_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("L.R. {}", lr_no)))?;

        info!(lr_id = inserted.id, "lorry receipt created");

        self.audit
            .record(
                AuditEntry::new(&actor.username, "create", "lr")
                    .entity_no(&inserted.lr_no)
                    .year(year)
                    .new_data(serde_json::to_value(&inserted).unwrap_or_default()),
            )
            .await;

        Ok(inserted)
    }

    /// Replaces the booking fields. Delivery state and the cash memo flag
    /// are only ever changed through their own operations.
    #[instrument(skip(self, payload, actor), fields(lr_id = id))]
    pub async fn update_lr(
        &self,
        year: i32,
        id: i32,
        payload: LrPayload,
        actor: &AuthUser,
    ) -> Result<LrModel, ServiceError> {
        payload.validate()?;

        let existing = self.find_in_year(year, id).await?;
        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

        let dd_total = ledger::dd_total(payload.dd_rate, payload.pkgs, payload.dd_total);
        let lr_no = payload.lr_no.trim().to_string();

        let mut model: lorry_receipt::ActiveModel = existing.into();
        model.memo_id = Set(payload.memo_id);
        model.lr_no = Set(lr_no.clone());
        model.lr_date = Set(payload.lr_date);
        model.from_city = Set(payload.from_city.trim().to_string());
        model.to_city = Set(payload.to_city.trim().to_string());
        model.consignor = Set(payload.consignor);
        model.consignee = Set(payload.consignee);
        model.pkgs = Set(payload.pkgs);
        model.content = Set(payload.content);
        model.freight_type = Set(payload.freight_type);
        model.freight = Set(payload.freight.unwrap_or_default());
        model.weight = Set(payload.weight);
        model.dd_rate = Set(payload.dd_rate);
        model.dd_total = Set(dd_total);
        model.pm_no = Set(payload.pm_no);
        model.refund = Set(payload.refund.unwrap_or_default());
        model.remarks = Set(payload.remarks);
        model.updated_by = Set(Some(actor.username.clone()));
        model.updated_at = Set(Some(Utc::now()));

        let updated = model
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("L.R. {}", lr_no)))?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "lr")
                    .entity_no(&updated.lr_no)
                    .year(year)
                    .old_data(old_snapshot)
                    .new_data(serde_json::to_value(&updated).unwrap_or_default()),
            )
            .await;

        Ok(updated)
    }

    /// Deletes a receipt together with its cash memo, if any.
    #[instrument(skip(self, actor), fields(lr_id = id))]
    pub async fn delete_lr(&self, year: i32, id: i32, actor: &AuthUser) -> Result<(), ServiceError> {
        let existing = self.find_in_year(year, id).await?;
        let snapshot = serde_json::to_value(&existing).unwrap_or_default();
        let lr_no = existing.lr_no.clone();

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to start LR delete transaction");
            ServiceError::DatabaseError(e)
        })?;

        CashMemoEntity::delete_many()
            .filter(cash_memo::Column::LrId.eq(existing.id))
            .exec(&txn)
            .await?;

        existing.delete(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "delete", "lr")
                    .entity_no(&lr_no)
                    .year(year)
                    .old_data(snapshot),
            )
            .await;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_lr(&self, year: i32, id: i32) -> Result<LrDetail, ServiceError> {
        let lr = self.find_in_year(year, id).await?;
        let cash_memo = lr.find_related(CashMemoEntity).one(&*self.db_pool).await?;
        Ok(LrDetail::assemble(lr, cash_memo))
    }

    /// LR with its memo, for the details view.
    #[instrument(skip(self))]
    pub async fn lr_details(&self, year: i32, id: i32) -> Result<LrFullDetails, ServiceError> {
        let lr = self.find_in_year(year, id).await?;
        let memo = lr.find_related(MemoEntity).one(&*self.db_pool).await?;
        let cash_memo = lr.find_related(CashMemoEntity).one(&*self.db_pool).await?;
        Ok(LrFullDetails {
            lr: LrDetail::assemble(lr, cash_memo),
            memo,
        })
    }

    /// All receipts for a year, optionally narrowed to one memo.
    #[instrument(skip(self))]
    pub async fn list_lrs(
        &self,
        year: i32,
        memo_id: Option<i32>,
    ) -> Result<Vec<LrDetail>, ServiceError> {
        let mut query = LrEntity::find().filter(lorry_receipt::Column::FiscalYear.eq(year));
        if let Some(memo_id) = memo_id {
            query = query.filter(lorry_receipt::Column::MemoId.eq(memo_id));
        }

        let rows = query
            .order_by_asc(lorry_receipt::Column::LrNo)
            .find_also_related(CashMemoEntity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(lr, cm)| LrDetail::assemble(lr, cm))
            .collect())
    }

    /// Lookup by L.R. number, `{lr, cashMemo}` shape.
    #[instrument(skip(self))]
    pub async fn lookup_by_lr_no(
        &self,
        year: i32,
        lr_no: &str,
    ) -> Result<LrCashMemoPair, ServiceError> {
        let lr = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::LrNo.eq(lr_no.trim()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("L.R. {}", lr_no)))?;

        let cash_memo = lr.find_related(CashMemoEntity).one(&*self.db_pool).await?;
        let cash_memo =
            cash_memo.map(|cm| CashMemoDetail::compute(cm, lr.freight, &lr.freight_type));

        Ok(LrCashMemoPair { lr, cash_memo })
    }

    /// Reverse lookup from a cash memo number.
    #[instrument(skip(self))]
    pub async fn lookup_by_cash_memo_no(
        &self,
        year: i32,
        cash_memo_no: i64,
    ) -> Result<LrCashMemoPair, ServiceError> {
        let cash_memo = CashMemoEntity::find()
            .filter(cash_memo::Column::FiscalYear.eq(year))
            .filter(cash_memo::Column::CashMemoNo.eq(cash_memo_no))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cash memo {}", cash_memo_no)))?;

        let lr = LrEntity::find_by_id(cash_memo.lr_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Lorry receipt".to_string()))?;

        let detail = CashMemoDetail::compute(cash_memo, lr.freight, &lr.freight_type);

        Ok(LrCashMemoPair {
            lr,
            cash_memo: Some(detail),
        })
    }

    /// Search over receipts with memo joins. An empty match is a valid
    /// result, not an error.
    #[instrument(skip(self, filters))]
    pub async fn search_lrs(
        &self,
        year: i32,
        filters: LrSearchFilters,
        page: u64,
        page_size: u64,
    ) -> Result<LrSearchPage, ServiceError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut query = LrEntity::find()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .find_also_related(MemoEntity);

        if let Some(needle) = trimmed(&filters.lr_no) {
            query = query.filter(lorry_receipt::Column::LrNo.contains(needle));
        }
        if let Some(needle) = trimmed(&filters.consignor) {
            query = query.filter(lorry_receipt::Column::Consignor.contains(needle));
        }
        if let Some(needle) = trimmed(&filters.consignee) {
            query = query.filter(lorry_receipt::Column::Consignee.contains(needle));
        }
        if let Some(status) = trimmed(&filters.status) {
            query = query.filter(lorry_receipt::Column::Status.eq(status));
        }
        if let Some(from) = filters.lr_date_from {
            query = query.filter(lorry_receipt::Column::LrDate.gte(from));
        }
        if let Some(to) = filters.lr_date_to {
            query = query.filter(lorry_receipt::Column::LrDate.lte(to));
        }
        if let Some(from) = filters.memo_date_from {
            query = query.filter(memo::Column::MemoDate.gte(from));
        }
        if let Some(to) = filters.memo_date_to {
            query = query.filter(memo::Column::MemoDate.lte(to));
        }
        if let Some(from) = filters.arrival_date_from {
            query = query.filter(memo::Column::ArrivalDate.gte(from));
        }
        if let Some(to) = filters.arrival_date_to {
            query = query.filter(memo::Column::ArrivalDate.lte(to));
        }

        let paginator = query
            .order_by_desc(lorry_receipt::Column::LrDate)
            .order_by_desc(lorry_receipt::Column::Id)
            .paginate(&*self.db_pool, page_size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        // Batch-fetch cash memos for the page instead of one query per row.
        let lr_ids: Vec<i32> = rows.iter().map(|(lr, _)| lr.id).collect();
        let mut cash_memos: HashMap<i32, CashMemoModel> = if lr_ids.is_empty() {
            HashMap::new()
        } else {
            CashMemoEntity::find()
                .filter(cash_memo::Column::LrId.is_in(lr_ids))
                .all(&*self.db_pool)
                .await?
                .into_iter()
                .map(|cm| (cm.lr_id, cm))
                .collect()
        };

        let results = rows
            .into_iter()
            .map(|(lr, memo)| {
                let cm = cash_memos.remove(&lr.id);
                LrSearchRow {
                    memo_no: memo.as_ref().map(|m| m.memo_no.clone()),
                    arrival_date: memo.as_ref().map(|m| m.arrival_date),
                    truck_no: memo.map(|m| m.truck_no),
                    detail: LrDetail::assemble(lr, cm),
                }
            })
            .collect();

        Ok(LrSearchPage { results, total })
    }

    /// Marks a batch of receipts delivered. Rows are updated independently;
    /// already-delivered rows are skipped and counted only in `total`.
    #[instrument(skip(self, request, actor), fields(count = request.lr_ids.len()))]
    pub async fn mark_delivered(
        &self,
        year: i32,
        request: MarkDeliveredRequest,
        actor: &AuthUser,
    ) -> Result<MarkDeliveredSummary, ServiceError> {
        let delivered_by = request.delivered_by.trim();
        if delivered_by.is_empty() {
            return Err(ServiceError::ValidationError(
                "Delivery person is required".to_string(),
            ));
        }

        let total = request.lr_ids.len() as u64;
        let mut updated = 0u64;
        let now = Utc::now();

        for lr_id in request.lr_ids {
            let Some(lr) = LrEntity::find_by_id(lr_id)
                .filter(lorry_receipt::Column::FiscalYear.eq(year))
                .one(&*self.db_pool)
                .await?
            else {
                continue;
            };

            if lr.status == STATUS_DELIVERED {
                continue;
            }

            let lr_no = lr.lr_no.clone();
            let mut model: lorry_receipt::ActiveModel = lr.into();
            model.status = Set(STATUS_DELIVERED.to_string());
            model.delivered_by = Set(Some(delivered_by.to_string()));
            model.delivered_at = Set(Some(now));
            model.updated_by = Set(Some(actor.username.clone()));
            model.updated_at = Set(Some(now));
            model.update(&*self.db_pool).await?;

            updated += 1;

            self.audit
                .record(
                    AuditEntry::new(&actor.username, "deliver", "lr")
                        .entity_no(&lr_no)
                        .year(year)
                        .details(format!("delivered by {}", delivered_by)),
                )
                .await;
        }

        info!(updated, total, "delivery batch finished");

        Ok(MarkDeliveredSummary { updated, total })
    }

    async fn find_in_year(&self, year: i32, id: i32) -> Result<LrModel, ServiceError> {
        LrEntity::find_by_id(id)
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Lorry receipt".to_string()))
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
