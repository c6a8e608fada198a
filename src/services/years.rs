use crate::{
    db::DbPool,
    entities::fiscal_year::{self, Entity as FiscalYearEntity},
    errors::ServiceError,
    fiscal,
    services::sequence::SequenceAllocator,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Registry of fiscal years. Replaces per-year bookkeeping tables with a
/// single registry row plus the sequence counter for that year.
#[derive(Clone)]
pub struct YearService {
    db_pool: Arc<DbPool>,
}

impl YearService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Registers `year` if it is not yet known. Idempotent; safe to call on
    /// every mutating request. Also seeds the cash memo counter so imported
    /// historical data keeps numbering monotonic.
    #[instrument(skip(self))]
    pub async fn ensure_year(&self, year: i32) -> Result<(), ServiceError> {
        if !(1990..=2100).contains(&year) {
            return Err(ServiceError::BadRequest(format!(
                "Invalid fiscal year: {}",
                year
            )));
        }

        let db = &*self.db_pool;

        if FiscalYearEntity::find_by_id(year).one(db).await?.is_none() {
            let row = fiscal_year::ActiveModel {
                year: Set(year),
                created_at: Set(Utc::now()),
            };
            // Lost insert races mean another request registered the year.
            match row.insert(db).await {
                Ok(_) => info!(year, "registered fiscal year"),
                Err(e) => {
                    if FiscalYearEntity::find_by_id(year).one(db).await?.is_none() {
                        return Err(ServiceError::DatabaseError(e));
                    }
                }
            }
        }

        SequenceAllocator::ensure_counter(db, year).await
    }

    /// All registered years, newest first. The current fiscal year is always
    /// present in the response even before its first write.
    #[instrument(skip(self))]
    pub async fn list_years(&self) -> Result<Vec<i32>, ServiceError> {
        let mut years: Vec<i32> = FiscalYearEntity::find()
            .order_by_desc(fiscal_year::Column::Year)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|y| y.year)
            .collect();

        let current = fiscal::current_fiscal_year();
        if !years.contains(&current) {
            years.insert(0, current);
            years.sort_unstable_by(|a, b| b.cmp(a));
        }

        Ok(years)
    }

    /// Explicit registration endpoint for administrators preparing a year
    /// ahead of its first booking.
    #[instrument(skip(self))]
    pub async fn add_year(&self, year: i32) -> Result<(), ServiceError> {
        self.ensure_year(year).await
    }
}
