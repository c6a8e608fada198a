use crate::{
    auth::AuthUser,
    entities::lorry_receipt::Model as LrModel,
    errors::ServiceError,
    handlers::common::{resolve_year, YearQuery},
    services::lorry_receipts::{
        LrCashMemoPair, LrDetail, LrFullDetails, LrPayload, LrSearchFilters, LrSearchPage,
        MarkDeliveredRequest, MarkDeliveredSummary,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LrListParams {
    pub year: Option<i32>,
    pub memo_id: Option<i32>,
}

// Query strings cannot round-trip nested structs, so the filter fields are
// spelled out here and copied over.
#[derive(Debug, Deserialize)]
pub struct LrSearchParams {
    pub year: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub lr_no: Option<String>,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub status: Option<String>,
    pub lr_date_from: Option<chrono::NaiveDate>,
    pub lr_date_to: Option<chrono::NaiveDate>,
    pub memo_date_from: Option<chrono::NaiveDate>,
    pub memo_date_to: Option<chrono::NaiveDate>,
    pub arrival_date_from: Option<chrono::NaiveDate>,
    pub arrival_date_to: Option<chrono::NaiveDate>,
}

impl LrSearchParams {
    fn filters(&mut self) -> LrSearchFilters {
        LrSearchFilters {
            lr_no: self.lr_no.take(),
            consignor: self.consignor.take(),
            consignee: self.consignee.take(),
            status: self.status.take(),
            lr_date_from: self.lr_date_from,
            lr_date_to: self.lr_date_to,
            memo_date_from: self.memo_date_from,
            memo_date_to: self.memo_date_to,
            arrival_date_from: self.arrival_date_from,
            arrival_date_to: self.arrival_date_to,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct MarkDeliveredBody {
    pub year: Option<i32>,
    #[serde(flatten)]
    pub request: MarkDeliveredRequest,
}

pub async fn list_lrs(
    State(state): State<AppState>,
    Query(params): Query<LrListParams>,
) -> Result<Json<Vec<LrDetail>>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    Ok(Json(
        state.services.lrs.list_lrs(year, params.memo_id).await?,
    ))
}

pub async fn search_lrs(
    State(state): State<AppState>,
    Query(mut params): Query<LrSearchParams>,
) -> Result<Json<LrSearchPage>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let filters = params.filters();
    Ok(Json(
        state
            .services
            .lrs
            .search_lrs(year, filters, params.page, params.limit)
            .await?,
    ))
}

pub async fn lookup_lr(
    State(state): State<AppState>,
    Path(lr_no): Path<String>,
    Query(query): Query<YearQuery>,
) -> Result<Json<LrCashMemoPair>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.lrs.lookup_by_lr_no(year, &lr_no).await?))
}

pub async fn get_by_cash_memo_no(
    State(state): State<AppState>,
    Path(cash_memo_no): Path<i64>,
    Query(query): Query<YearQuery>,
) -> Result<Json<LrCashMemoPair>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(
        state
            .services
            .lrs
            .lookup_by_cash_memo_no(year, cash_memo_no)
            .await?,
    ))
}

pub async fn get_lr(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<LrDetail>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.lrs.get_lr(year, id).await?))
}

pub async fn lr_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<LrFullDetails>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.lrs.lr_details(year, id).await?))
}

pub async fn create_lr(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<LrPayload>,
) -> Result<(StatusCode, Json<LrModel>), ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    let created = state.services.lrs.create_lr(year, payload, &user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_lr(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<LrPayload>,
) -> Result<Json<LrModel>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(
        state.services.lrs.update_lr(year, id, payload, &user).await?,
    ))
}

pub async fn delete_lr(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<StatusCode, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    state.services.lrs.delete_lr(year, id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_delivered(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<MarkDeliveredBody>,
) -> Result<Json<MarkDeliveredSummary>, ServiceError> {
    let year = resolve_year(&state, body.year).await?;
    Ok(Json(
        state
            .services
            .lrs
            .mark_delivered(year, body.request, &user)
            .await?,
    ))
}
