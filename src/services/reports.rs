use crate::{
    db::DbPool,
    entities::cash_memo::{self, Entity as CashMemoEntity, Model as CashMemoModel},
    entities::lorry_receipt::{self, Entity as LrEntity, Model as LrModel},
    entities::memo::{self, Entity as MemoEntity},
    errors::ServiceError,
    ledger,
    services::lorry_receipts::STATUS_DELIVERED,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Selects which memo date column a report range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemoDateField {
    #[default]
    Memo,
    Arrival,
}

impl MemoDateField {
    /// `filter=arrival` switches to the arrival date; anything else,
    /// including an absent parameter, means the memo date.
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter {
            Some("arrival") => MemoDateField::Arrival,
            _ => MemoDateField::Memo,
        }
    }

    fn column(self) -> memo::Column {
        match self {
            MemoDateField::Memo => memo::Column::MemoDate,
            MemoDateField::Arrival => memo::Column::ArrivalDate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoorDeliveryTotals {
    pub lrs: u64,
    pub pkgs: i64,
    pub dd_total: Decimal,
}

/// Door-delivery charges for the receipts of one memo.
#[derive(Debug, Serialize)]
pub struct DoorDeliveryReport {
    pub arrival_date: NaiveDate,
    pub lrs: Vec<LrModel>,
    pub totals: DoorDeliveryTotals,
}

#[derive(Debug, Serialize)]
pub struct TruckTotals {
    pub lrs: u64,
    pub pkgs: i64,
    pub topay: Decimal,
    pub paid: Decimal,
    pub weight: Decimal,
    pub dd_total: Decimal,
    pub refund: Decimal,
}

/// Every receipt that travelled on one memo's truck.
#[derive(Debug, Serialize)]
pub struct TruckReport {
    pub truck_no: String,
    pub lrs: Vec<LrModel>,
    pub totals: TruckTotals,
}

/// One memo with its receipt sums, listed by the monthly report.
#[derive(Debug, Serialize)]
pub struct MonthlyReportRow {
    pub memo_no: String,
    pub memo_date: NaiveDate,
    pub arrival_date: NaiveDate,
    pub truck_no: String,
    pub total_topay: Decimal,
    pub total_paid: Decimal,
    pub total_refund: Decimal,
    pub balance_lorry_hire: Decimal,
    pub total_dd: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MonthlyTotals {
    pub total_memos: u64,
    pub total_topay: Decimal,
    pub total_paid: Decimal,
    pub total_refund: Decimal,
    pub total_balance_lorry_hire: Decimal,
    pub total_dd: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub rows: Vec<MonthlyReportRow>,
    pub totals: MonthlyTotals,
}

#[derive(Debug, Serialize)]
pub struct RefundReportRow {
    #[serde(flatten)]
    pub lr: LrModel,
    pub memo_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefundTotals {
    pub total_lrs: u64,
    pub total_pkgs: i64,
    pub total_freight: Decimal,
    pub total_refund: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RefundReport {
    pub rows: Vec<RefundReportRow>,
    pub totals: RefundTotals,
}

#[derive(Debug, Default)]
pub struct NoCashMemoFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub date_field: MemoDateField,
    pub memo_no: Option<String>,
    pub truck_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoCashMemoRow {
    #[serde(flatten)]
    pub lr: LrModel,
    pub memo_no: Option<String>,
    pub memo_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub truck_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoCashMemoTotals {
    pub total_lrs: u64,
    pub total_pkgs: i64,
}

#[derive(Debug, Serialize)]
pub struct NoCashMemoReport {
    pub rows: Vec<NoCashMemoRow>,
    pub totals: NoCashMemoTotals,
    #[serde(rename = "allMemos")]
    pub all_memos: Vec<String>,
    #[serde(rename = "allTrucks")]
    pub all_trucks: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DeliveryFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub memo_no: Option<String>,
    pub delivered_by: Option<String>,
}

/// Delivered receipt with its memo columns and the recomputed collection
/// total. Charges are zero when no cash memo was issued.
#[derive(Debug, Serialize)]
pub struct DeliveryReportRow {
    #[serde(flatten)]
    pub lr: LrModel,
    pub memo_no: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub truck_no: Option<String>,
    pub cash_memo_no: Option<i64>,
    pub hamali: Option<Decimal>,
    pub bc: Option<Decimal>,
    pub landing: Option<Decimal>,
    pub lc: Option<Decimal>,
    pub true_cash_memo_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DeliveryTotals {
    pub total_lrs: u64,
    pub total_pkgs: i64,
    pub total_freight: Decimal,
    pub total_refund: Decimal,
    pub total_cash_memo: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DeliveryReport {
    pub rows: Vec<DeliveryReportRow>,
    pub totals: DeliveryTotals,
    #[serde(rename = "allMemos")]
    pub all_memos: Vec<String>,
    #[serde(rename = "allDeliveryPersons")]
    pub all_delivery_persons: Vec<String>,
}

#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Receipts of one memo that carry a door delivery charge.
    #[instrument(skip(self))]
    pub async fn door_delivery(
        &self,
        year: i32,
        memo_id: i32,
    ) -> Result<DoorDeliveryReport, ServiceError> {
        let memo = self.memo_of_year(year, memo_id).await?;

        let lrs = LrEntity::find()
            .filter(lorry_receipt::Column::MemoId.eq(memo.id))
            .filter(lorry_receipt::Column::DdTotal.is_not_null())
            .filter(lorry_receipt::Column::DdTotal.gt(Decimal::ZERO))
            .order_by_asc(lorry_receipt::Column::LrNo)
            .all(&*self.db_pool)
            .await?;

        let totals = DoorDeliveryTotals {
            lrs: lrs.len() as u64,
            pkgs: sum_pkgs(&lrs),
            dd_total: lrs.iter().filter_map(|lr| lr.dd_total).sum(),
        };

        Ok(DoorDeliveryReport {
            arrival_date: memo.arrival_date,
            lrs,
            totals,
        })
    }

    /// Everything loaded on one memo's truck, with per-freight-type sums.
    #[instrument(skip(self))]
    pub async fn truck(&self, year: i32, memo_id: i32) -> Result<TruckReport, ServiceError> {
        let memo = self.memo_of_year(year, memo_id).await?;

        let lrs = LrEntity::find()
            .filter(lorry_receipt::Column::MemoId.eq(memo.id))
            .order_by_asc(lorry_receipt::Column::LrNo)
            .all(&*self.db_pool)
            .await?;

        let mut totals = TruckTotals {
            lrs: lrs.len() as u64,
            pkgs: sum_pkgs(&lrs),
            topay: Decimal::ZERO,
            paid: Decimal::ZERO,
            weight: Decimal::ZERO,
            dd_total: Decimal::ZERO,
            refund: Decimal::ZERO,
        };
        for lr in &lrs {
            match lr.freight_type.as_str() {
                ledger::FREIGHT_TYPE_TOPAY => totals.topay += lr.freight,
                ledger::FREIGHT_TYPE_PAID => totals.paid += lr.freight,
                _ => {}
            }
            totals.weight += lr.weight.unwrap_or_default();
            totals.dd_total += lr.dd_total.unwrap_or_default();
            totals.refund += lr.refund;
        }

        Ok(TruckReport {
            truck_no: memo.truck_no,
            lrs,
            totals,
        })
    }

    /// One row per memo in the date range, with its receipt sums.
    #[instrument(skip(self))]
    pub async fn monthly(
        &self,
        year: i32,
        from: NaiveDate,
        to: NaiveDate,
        date_field: MemoDateField,
    ) -> Result<MonthlyReport, ServiceError> {
        let col = date_field.column();
        let memos = MemoEntity::find()
            .filter(memo::Column::FiscalYear.eq(year))
            .filter(col.gte(from))
            .filter(col.lte(to))
            .order_by_asc(col)
            .all(&*self.db_pool)
            .await?;

        let memo_ids: Vec<i32> = memos.iter().map(|m| m.id).collect();
        let lrs: Vec<LrModel> = if memo_ids.is_empty() {
            Vec::new()
        } else {
            LrEntity::find()
                .filter(lorry_receipt::Column::MemoId.is_in(memo_ids))
                .all(&*self.db_pool)
                .await?
        };

        #[derive(Default)]
        struct Sums {
            topay: Decimal,
            paid: Decimal,
            refund: Decimal,
            dd: Decimal,
        }
        let mut by_memo: HashMap<i32, Sums> = HashMap::new();
        for lr in &lrs {
            let sums = by_memo.entry(lr.memo_id).or_default();
            match lr.freight_type.as_str() {
                ledger::FREIGHT_TYPE_TOPAY => sums.topay += lr.freight,
                ledger::FREIGHT_TYPE_PAID => sums.paid += lr.freight,
                _ => {}
            }
            sums.refund += lr.refund;
            sums.dd += lr.dd_total.unwrap_or_default();
        }

        let mut totals = MonthlyTotals {
            total_memos: memos.len() as u64,
            total_topay: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_refund: Decimal::ZERO,
            total_balance_lorry_hire: Decimal::ZERO,
            total_dd: Decimal::ZERO,
        };
        let rows = memos
            .into_iter()
            .map(|m| {
                let sums = by_memo.remove(&m.id).unwrap_or_default();
                let balance_lorry_hire = m.total_lorry_hire - m.advance_lorry_hire;
                totals.total_topay += sums.topay;
                totals.total_paid += sums.paid;
                totals.total_refund += sums.refund;
                totals.total_balance_lorry_hire += balance_lorry_hire;
                totals.total_dd += sums.dd;
                MonthlyReportRow {
                    memo_no: m.memo_no,
                    memo_date: m.memo_date,
                    arrival_date: m.arrival_date,
                    truck_no: m.truck_no,
                    total_topay: sums.topay,
                    total_paid: sums.paid,
                    total_refund: sums.refund,
                    balance_lorry_hire,
                    total_dd: sums.dd,
                }
            })
            .collect();

        Ok(MonthlyReport { rows, totals })
    }

    /// Refunded receipts whose memo falls in the date range.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        year: i32,
        from: NaiveDate,
        to: NaiveDate,
        date_field: MemoDateField,
    ) -> Result<RefundReport, ServiceError> {
        let col = date_field.column();
        let rows = LrEntity::find()
            .find_also_related(MemoEntity)
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::Refund.gt(Decimal::ZERO))
            .filter(col.gte(from))
            .filter(col.lte(to))
            .order_by_asc(col)
            .order_by_asc(lorry_receipt::Column::LrDate)
            .all(&*self.db_pool)
            .await?;

        let mut totals = RefundTotals {
            total_lrs: rows.len() as u64,
            total_pkgs: 0,
            total_freight: Decimal::ZERO,
            total_refund: Decimal::ZERO,
        };
        let rows = rows
            .into_iter()
            .map(|(lr, m)| {
                totals.total_pkgs += i64::from(lr.pkgs.unwrap_or(0));
                totals.total_freight += lr.freight;
                totals.total_refund += lr.refund;
                RefundReportRow {
                    memo_no: m.map(|m| m.memo_no),
                    lr,
                }
            })
            .collect();

        Ok(RefundReport { rows, totals })
    }

    /// Receipts still waiting for a cash memo, whatever their freight type.
    #[instrument(skip(self))]
    pub async fn no_cash_memo(
        &self,
        year: i32,
        filters: NoCashMemoFilters,
    ) -> Result<NoCashMemoReport, ServiceError> {
        let mut query = LrEntity::find()
            .find_also_related(MemoEntity)
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::HasCashMemo.eq(false));

        if let (Some(from), Some(to)) = (filters.from, filters.to) {
            let col = filters.date_field.column();
            query = query.filter(col.gte(from)).filter(col.lte(to));
        }
        if let Some(memo_no) = filters.memo_no.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(memo::Column::MemoNo.eq(memo_no));
        }
        if let Some(truck_no) = filters.truck_no.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(memo::Column::TruckNo.eq(truck_no));
        }

        let rows = query
            .order_by_asc(memo::Column::MemoDate)
            .order_by_asc(memo::Column::ArrivalDate)
            .order_by_asc(lorry_receipt::Column::LrDate)
            .all(&*self.db_pool)
            .await?;

        let mut totals = NoCashMemoTotals {
            total_lrs: rows.len() as u64,
            total_pkgs: 0,
        };
        let rows: Vec<NoCashMemoRow> = rows
            .into_iter()
            .map(|(lr, m)| {
                totals.total_pkgs += i64::from(lr.pkgs.unwrap_or(0));
                NoCashMemoRow {
                    memo_no: m.as_ref().map(|m| m.memo_no.clone()),
                    memo_date: m.as_ref().map(|m| m.memo_date),
                    arrival_date: m.as_ref().map(|m| m.arrival_date),
                    truck_no: m.map(|m| m.truck_no),
                    lr,
                }
            })
            .collect();

        Ok(NoCashMemoReport {
            rows,
            totals,
            all_memos: self.memo_numbers(year).await?,
            all_trucks: self.truck_numbers(year).await?,
        })
    }

    /// Delivered receipts filtered by delivery date, memo, or person, with
    /// the collection total recomputed from the charge heads and freight.
    #[instrument(skip(self))]
    pub async fn delivery(
        &self,
        year: i32,
        filters: DeliveryFilters,
    ) -> Result<DeliveryReport, ServiceError> {
        let mut query = LrEntity::find()
            .find_also_related(MemoEntity)
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::Status.eq(STATUS_DELIVERED));

        if let Some(memo_no) = filters.memo_no.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(memo::Column::MemoNo.eq(memo_no));
        }
        if let Some(person) = filters.delivered_by.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(lorry_receipt::Column::DeliveredBy.eq(person));
        }

        let mut pairs = query
            .order_by_asc(lorry_receipt::Column::DeliveredAt)
            .order_by_asc(lorry_receipt::Column::LrNo)
            .all(&*self.db_pool)
            .await?;

        // Range filtering is on the calendar day of delivery, not booking.
        if let (Some(from), Some(to)) = (filters.from, filters.to) {
            pairs.retain(|(lr, _)| match lr.delivered_at {
                Some(at) => {
                    let day = at.date_naive();
                    day >= from && day <= to
                }
                None => false,
            });
        }

        let lr_ids: Vec<i32> = pairs.iter().map(|(lr, _)| lr.id).collect();
        let cash_memos: HashMap<i32, CashMemoModel> = if lr_ids.is_empty() {
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

        let mut totals = DeliveryTotals {
            total_lrs: pairs.len() as u64,
            total_pkgs: 0,
            total_freight: Decimal::ZERO,
            total_refund: Decimal::ZERO,
            total_cash_memo: Decimal::ZERO,
        };
        let rows = pairs
            .into_iter()
            .map(|(lr, m)| {
                let cm = cash_memos.get(&lr.id);
                let charges = match cm {
                    Some(cm) => ledger::CashMemoCharges::new(cm.hamali, cm.bc, cm.landing, cm.lc),
                    None => ledger::CashMemoCharges::default(),
                };
                let true_cash_memo_total =
                    ledger::cash_memo_total(charges, Some(lr.freight), &lr.freight_type);

                totals.total_pkgs += i64::from(lr.pkgs.unwrap_or(0));
                totals.total_freight += lr.freight;
                totals.total_refund += lr.refund;
                totals.total_cash_memo += true_cash_memo_total;

                DeliveryReportRow {
                    memo_no: m.as_ref().map(|m| m.memo_no.clone()),
                    arrival_date: m.as_ref().map(|m| m.arrival_date),
                    truck_no: m.map(|m| m.truck_no),
                    cash_memo_no: cm.map(|cm| cm.cash_memo_no),
                    hamali: cm.map(|cm| cm.hamali),
                    bc: cm.map(|cm| cm.bc),
                    landing: cm.map(|cm| cm.landing),
                    lc: cm.map(|cm| cm.lc),
                    true_cash_memo_total,
                    lr,
                }
            })
            .collect();

        Ok(DeliveryReport {
            rows,
            totals,
            all_memos: self.memo_numbers(year).await?,
            all_delivery_persons: self.delivery_person_names(year).await?,
        })
    }

    async fn memo_of_year(
        &self,
        year: i32,
        memo_id: i32,
    ) -> Result<memo::Model, ServiceError> {
        MemoEntity::find_by_id(memo_id)
            .filter(memo::Column::FiscalYear.eq(year))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Memo".to_string()))
    }

    async fn memo_numbers(&self, year: i32) -> Result<Vec<String>, ServiceError> {
        Ok(MemoEntity::find()
            .select_only()
            .column(memo::Column::MemoNo)
            .distinct()
            .filter(memo::Column::FiscalYear.eq(year))
            .order_by_asc(memo::Column::MemoNo)
            .into_tuple()
            .all(&*self.db_pool)
            .await?)
    }

    async fn truck_numbers(&self, year: i32) -> Result<Vec<String>, ServiceError> {
        Ok(MemoEntity::find()
            .select_only()
            .column(memo::Column::TruckNo)
            .distinct()
            .filter(memo::Column::FiscalYear.eq(year))
            .filter(memo::Column::TruckNo.ne(""))
            .order_by_asc(memo::Column::TruckNo)
            .into_tuple()
            .all(&*self.db_pool)
            .await?)
    }

    async fn delivery_person_names(&self, year: i32) -> Result<Vec<String>, ServiceError> {
        Ok(LrEntity::find()
            .select_only()
            .column(lorry_receipt::Column::DeliveredBy)
            .distinct()
            .filter(lorry_receipt::Column::FiscalYear.eq(year))
            .filter(lorry_receipt::Column::DeliveredBy.is_not_null())
            .filter(lorry_receipt::Column::DeliveredBy.ne(""))
            .order_by_asc(lorry_receipt::Column::DeliveredBy)
            .into_tuple()
            .all(&*self.db_pool)
            .await?)
    }
}

fn sum_pkgs(lrs: &[LrModel]) -> i64 {
    lrs.iter().map(|lr| i64::from(lr.pkgs.unwrap_or(0))).sum()
}
