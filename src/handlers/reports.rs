use crate::{
    errors::ServiceError,
    handlers::common::resolve_year,
    services::reports::{
        DeliveryFilters, DeliveryReport, DoorDeliveryReport, MemoDateField, MonthlyReport,
        NoCashMemoFilters, NoCashMemoReport, RefundReport, TruckReport,
    },
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub year: Option<i32>,
    pub memo_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub filter: Option<String>,
    pub memo_no: Option<String>,
    pub truck_no: Option<String>,
    pub delivered_by: Option<String>,
}

impl ReportParams {
    fn memo_id(&self) -> Result<i32, ServiceError> {
        self.memo_id
            .ok_or_else(|| ServiceError::BadRequest("memo_id is required".to_string()))
    }

    fn bounds(&self) -> Result<(NaiveDate, NaiveDate), ServiceError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(ServiceError::BadRequest(
                "from and to are required".to_string(),
            )),
        }
    }

    fn date_field(&self) -> MemoDateField {
        MemoDateField::from_filter(self.filter.as_deref())
    }
}

pub async fn door_delivery_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<DoorDeliveryReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let memo_id = params.memo_id()?;
    Ok(Json(
        state.services.reports.door_delivery(year, memo_id).await?,
    ))
}

pub async fn truck_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<TruckReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let memo_id = params.memo_id()?;
    Ok(Json(state.services.reports.truck(year, memo_id).await?))
}

pub async fn monthly_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<MonthlyReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let (from, to) = params.bounds()?;
    Ok(Json(
        state
            .services
            .reports
            .monthly(year, from, to, params.date_field())
            .await?,
    ))
}

pub async fn refund_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<RefundReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let (from, to) = params.bounds()?;
    Ok(Json(
        state
            .services
            .reports
            .refund(year, from, to, params.date_field())
            .await?,
    ))
}

pub async fn no_cash_memo_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<NoCashMemoReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let filters = NoCashMemoFilters {
        from: params.from,
        to: params.to,
        date_field: params.date_field(),
        memo_no: params.memo_no,
        truck_no: params.truck_no,
    };
    Ok(Json(
        state.services.reports.no_cash_memo(year, filters).await?,
    ))
}

pub async fn delivery_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<DeliveryReport>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let filters = DeliveryFilters {
        from: params.from,
        to: params.to,
        memo_no: params.memo_no,
        delivered_by: params.delivered_by,
    };
    Ok(Json(state.services.reports.delivery(year, filters).await?))
}
