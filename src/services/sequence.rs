use crate::{
    entities::cash_memo::{self, Entity as CashMemoEntity},
    entities::cash_memo_sequence::{self, Entity as SequenceEntity},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use tracing::{info, instrument};

/// Issues cash memo numbers from the per-year counter row.
///
/// Allocation is an increment-and-read against the counter inside the
/// caller's transaction, so concurrent creators serialize on the row and
/// every caller sees a distinct number. Numbers are never derived from
/// MAX() over issued memos at allocation time.
pub struct SequenceAllocator;

impl SequenceAllocator {
    /// Allocates the next cash memo number for `year`.
    ///
    /// Must be called inside the transaction that also inserts the cash
    /// memo, so an abandoned allocation rolls back with it.
    #[instrument(skip(conn))]
    pub async fn next_cash_memo_no<C: ConnectionTrait>(
        conn: &C,
        year: i32,
    ) -> Result<i64, ServiceError> {
        let updated = SequenceEntity::update_many()
            .col_expr(
                cash_memo_sequence::Column::LastNo,
                Expr::col(cash_memo_sequence::Column::LastNo).add(1),
            )
            .filter(cash_memo_sequence::Column::FiscalYear.eq(year))
            .exec(conn)
            .await?;

        if updated.rows_affected == 0 {
            // Year was never registered. Seed from issued memos and take the
            // next slot in one step.
            let seed = Self::seed_value(conn, year).await?;
            let row = cash_memo_sequence::ActiveModel {
                fiscal_year: Set(year),
                last_no: Set(seed + 1),
            };
            row.insert(conn).await?;
            info!(year, seed, "seeded cash memo sequence on first allocation");
            return Ok(seed + 1);
        }

        let row = SequenceEntity::find_by_id(year)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("cash memo sequence row missing for {}", year))
            })?;

        Ok(row.last_no)
    }

    /// Highest cash memo number already issued for `year`, zero when none.
    /// Used only to seed a fresh counter row.
    pub async fn seed_value<C: ConnectionTrait>(conn: &C, year: i32) -> Result<i64, ServiceError> {
        let max: Option<Option<i64>> = CashMemoEntity::find()
            .select_only()
            .column_as(cash_memo::Column::CashMemoNo.max(), "max_no")
            .filter(cash_memo::Column::FiscalYear.eq(year))
            .into_tuple()
            .one(conn)
            .await?;

        Ok(max.flatten().unwrap_or(0))
    }

    /// Creates the counter row for `year` if absent, seeded from issued
    /// memos. Idempotent.
    pub async fn ensure_counter<C: ConnectionTrait>(
        conn: &C,
        year: i32,
    ) -> Result<(), ServiceError> {
        if SequenceEntity::find_by_id(year).one(conn).await?.is_some() {
            return Ok(());
        }

        let seed = Self::seed_value(conn, year).await?;
        let row = cash_memo_sequence::ActiveModel {
            fiscal_year: Set(year),
            last_no: Set(seed),
        };
        // A concurrent ensure may have inserted the row first; that is fine.
        if let Err(e) = row.insert(conn).await {
            let already_there = SequenceEntity::find_by_id(year).one(conn).await?.is_some();
            if !already_there {
                return Err(ServiceError::DatabaseError(e));
            }
        } else {
            info!(year, seed, "registered cash memo sequence");
        }

        Ok(())
    }
}
