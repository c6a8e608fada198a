use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::cash_memo::{self, Entity as CashMemoEntity, Model as CashMemoModel},
    entities::lorry_receipt::{self, Entity as LrEntity},
    errors::ServiceError,
    ledger::{self, CashMemoCharges},
    services::audit::{AuditEntry, AuditService},
    services::sequence::SequenceAllocator,
};
use chrono::Utc;
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
pub struct CashMemoPayload {
    pub lr_id: i32,
    #[serde(default)]
    pub hamali: Option<Decimal>,
    #[serde(default)]
    pub bc: Option<Decimal>,
    #[serde(default)]
    pub landing: Option<Decimal>,
    #[serde(default)]
    pub lc: Option<Decimal>,
}

/// Cash memo as served on read paths. `true_cash_memo_total` is recomputed
/// from the charge heads and the owning receipt's freight on every read, so
/// a drifted stored total can never reach a client unnoticed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMemoDetail {
    #[serde(flatten)]
    pub cash_memo: CashMemoModel,
    pub true_cash_memo_total: Decimal,
}

impl CashMemoDetail {
    pub fn compute(cash_memo: CashMemoModel, freight: Decimal, freight_type: &str) -> Self {
        let charges = CashMemoCharges::new(
            cash_memo.hamali,
            cash_memo.bc,
            cash_memo.landing,
            cash_memo.lc,
        );
        let true_total = ledger::cash_memo_total(charges, Some(freight), freight_type);
        Self {
            cash_memo,
            true_cash_memo_total: true_total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CashMemoCreated {
    pub id: i32,
    pub cash_memo_no: i64,
}

#[derive(Debug, Serialize)]
pub struct CashMemoListPage {
    pub data: Vec<CashMemoDetail>,
    pub total: u64,
}

#[derive(Clone)]
pub struct CashMemoService {
    db_pool: Arc<DbPool>,
    audit: AuditService,
}

impl CashMemoService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditService) -> Self {
        Self { db_pool, audit }
    }

    /// Creates a cash memo against a lorry receipt. The sequence allocation,
    /// the insert, and the receipt flag update share one transaction.
    #[instrument(skip(self, payload, actor), fields(lr_id = payload.lr_id, year))]
    pub async fn create_cash_memo(
        &self,
        year: i32,
        payload: CashMemoPayload,
        actor: &AuthUser,
    ) -> Result<CashMemoCreated, ServiceError> {
        payload.validate()?;

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to start cash memo transaction");
            ServiceError::DatabaseError(e)
        })?;

        let lr = LrEntity::find_by_id(payload.lr_id)
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::BadRequest("Invalid L.R. for cash memo".to_string()))?;

        let existing = CashMemoEntity::find()
            .filter(cash_memo::Column::LrId.eq(lr.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::BadRequest(
                "Cash memo already exists for this L.R.".to_string(),
            ));
        }

        let cash_memo_no = SequenceAllocator::next_cash_memo_no(&txn, year).await?;

        let charges = CashMemoCharges::new(payload.hamali, payload.bc, payload.landing, payload.lc);
        let total = ledger::cash_memo_total(charges, Some(lr.freight), &lr.freight_type);

        let now = Utc::now();
        let model = cash_memo::ActiveModel {
            fiscal_year: Set(year),
            cash_memo_no: Set(cash_memo_no),
            lr_id: Set(lr.id),
            hamali: Set(payload.hamali.unwrap_or_default()),
            bc: Set(payload.bc.unwrap_or_default()),
            landing: Set(payload.landing.unwrap_or_default()),
            lc: Set(payload.lc.unwrap_or_default()),
            cash_memo_total: Set(total),
            created_by: Set(Some(actor.username.clone())),
            created_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("Cash memo {}", cash_memo_no)))?;

        let mut lr_active: lorry_receipt::ActiveModel = lr.clone().into();
        lr_active.has_cash_memo = Set(true);
        lr_active.updated_by = Set(Some(actor.username.clone()));
        lr_active.updated_at = Set(Some(now));
        lr_active.update(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(cash_memo_no, lr_no = %lr.lr_no, "cash memo issued");

        self.audit
            .record(
                AuditEntry::new(&actor.username, "create", "cashmemo")
                    .entity_no(cash_memo_no)
                    .year(year)
                    .new_data(serde_json::to_value(&inserted).unwrap_or_default())
                    .details(format!("against L.R. {}", lr.lr_no)),
            )
            .await;

        Ok(CashMemoCreated {
            id: inserted.id,
            cash_memo_no,
        })
    }

    /// Updates the charge heads; the total is always recomputed, never taken
    /// from the request.
    #[instrument(skip(self, payload, actor), fields(cash_memo_id = id))]
    pub async fn update_cash_memo(
        &self,
        year: i32,
        id: i32,
        payload: CashMemoPayload,
        actor: &AuthUser,
    ) -> Result<CashMemoDetail, ServiceError> {
        payload.validate()?;

        let existing = self.find_in_year(year, id).await?;
        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

        let lr = LrEntity::find_by_id(existing.lr_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Lorry receipt".to_string()))?;

        let charges = CashMemoCharges::new(payload.hamali, payload.bc, payload.landing, payload.lc);
        let total = ledger::cash_memo_total(charges, Some(lr.freight), &lr.freight_type);

        let mut model: cash_memo::ActiveModel = existing.into();
        model.hamali = Set(payload.hamali.unwrap_or_default());
        model.bc = Set(payload.bc.unwrap_or_default());
        model.landing = Set(payload.landing.unwrap_or_default());
        model.lc = Set(payload.lc.unwrap_or_default());
        model.cash_memo_total = Set(total);
        model.updated_by = Set(Some(actor.username.clone()));
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "cashmemo")
                    .entity_no(updated.cash_memo_no)
                    .year(year)
                    .old_data(old_snapshot)
                    .new_data(serde_json::to_value(&updated).unwrap_or_default()),
            )
            .await;

        Ok(CashMemoDetail::compute(updated, lr.freight, &lr.freight_type))
    }

    /// Deletes a cash memo and clears the receipt's flag in one transaction.
    #[instrument(skip(self, actor), fields(cash_memo_id = id))]
    pub async fn delete_cash_memo(
        &self,
        year: i32,
        id: i32,
        actor: &AuthUser,
    ) -> Result<(), ServiceError> {
        let existing = self.find_in_year(year, id).await?;
        let snapshot = serde_json::to_value(&existing).unwrap_or_default();
        let cash_memo_no = existing.cash_memo_no;
        let lr_id = existing.lr_id;

        let txn = self.db_pool.begin().await.map_err(ServiceError::DatabaseError)?;

        existing.delete(&txn).await?;

        if let Some(lr) = LrEntity::find_by_id(lr_id).one(&txn).await? {
            let mut lr_active: lorry_receipt::ActiveModel = lr.into();
            lr_active.has_cash_memo = Set(false);
            lr_active.updated_by = Set(Some(actor.username.clone()));
            lr_active.updated_at = Set(Some(Utc::now()));
            lr_active.update(&txn).await?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "delete", "cashmemo")
                    .entity_no(cash_memo_no)
                    .year(year)
                    .old_data(snapshot),
            )
            .await;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_cash_memo(&self, year: i32, id: i32) -> Result<CashMemoDetail, ServiceError> {
        let cash_memo = self.find_in_year(year, id).await?;
        self.with_freight(cash_memo).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_lr_id(
        &self,
        year: i32,
        lr_id: i32,
    ) -> Result<CashMemoDetail, ServiceError> {
        let cash_memo = CashMemoEntity::find()
            .filter(cash_memo::Column::FiscalYear.eq(year))
            .filter(cash_memo::Column::LrId.eq(lr_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cash memo".to_string()))?;
        self.with_freight(cash_memo).await
    }

    /// Simple listing with optional exact filters, newest numbers first.
    #[instrument(skip(self))]
    pub async fn list_cash_memos(
        &self,
        year: i32,
        lr_id: Option<i32>,
        cash_memo_no: Option<i64>,
    ) -> Result<Vec<CashMemoDetail>, ServiceError> {
        let mut query = CashMemoEntity::find().filter(cash_memo::Column::FiscalYear.eq(year));
        if let Some(lr_id) = lr_id {
            query = query.filter(cash_memo::Column::LrId.eq(lr_id));
        }
        if let Some(no) = cash_memo_no {
            query = query.filter(cash_memo::Column::CashMemoNo.eq(no));
        }

        let rows = query
            .order_by_desc(cash_memo::Column::CashMemoNo)
            .find_also_related(LrEntity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(cm, lr)| match lr {
                Some(lr) => CashMemoDetail::compute(cm, lr.freight, &lr.freight_type),
                None => CashMemoDetail::compute(cm, Decimal::ZERO, ""),
            })
            .collect())
    }

    /// Paginated listing with optional search over the memo number.
    #[instrument(skip(self))]
    pub async fn list_cash_memos_paged(
        &self,
        year: i32,
        page: u64,
        page_size: u64,
        search: Option<String>,
    ) -> Result<CashMemoListPage, ServiceError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut query = CashMemoEntity::find().filter(cash_memo::Column::FiscalYear.eq(year));
        if let Some(needle) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if let Ok(no) = needle.parse::<i64>() {
                query = query.filter(cash_memo::Column::CashMemoNo.eq(no));
            }
        }

        let paginator = query
            .order_by_desc(cash_memo::Column::CashMemoNo)
            .find_also_related(LrEntity)
            .paginate(&*self.db_pool, page_size);

        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(page - 1)
            .await?
            .into_iter()
            .map(|(cm, lr)| match lr {
                Some(lr) => CashMemoDetail::compute(cm, lr.freight, &lr.freight_type),
                None => CashMemoDetail::compute(cm, Decimal::ZERO, ""),
            })
            .collect();

        Ok(CashMemoListPage { data, total })
    }

    async fn find_in_year(&self, year: i32, id: i32) -> Result<CashMemoModel, ServiceError> {
        CashMemoEntity::find_by_id(id)
            .filter(cash_memo::Column::FiscalYear.eq(year))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cash memo".to_string()))
    }

    async fn with_freight(&self, cash_memo: CashMemoModel) -> Result<CashMemoDetail, ServiceError> {
        let lr = LrEntity::find_by_id(cash_memo.lr_id)
            .one(&*self.db_pool)
            .await?;
        Ok(match lr {
            Some(lr) => CashMemoDetail::compute(cash_memo, lr.freight, &lr.freight_type),
            None => CashMemoDetail::compute(cash_memo, Decimal::ZERO, ""),
        })
    }
}
