use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{default_limit, default_page, resolve_year, YearQuery},
    services::cash_memos::{CashMemoCreated, CashMemoDetail, CashMemoListPage, CashMemoPayload},
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
pub struct CashMemoListParams {
    pub year: Option<i32>,
    pub lr_id: Option<i32>,
    pub cash_memo_no: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CashMemoPageParams {
    pub year: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

pub async fn list_cash_memos(
    State(state): State<AppState>,
    Query(params): Query<CashMemoListParams>,
) -> Result<Json<Vec<CashMemoDetail>>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    Ok(Json(
        state
            .services
            .cash_memos
            .list_cash_memos(year, params.lr_id, params.cash_memo_no)
            .await?,
    ))
}

pub async fn list_cash_memos_paged(
    State(state): State<AppState>,
    Query(params): Query<CashMemoPageParams>,
) -> Result<Json<CashMemoListPage>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    Ok(Json(
        state
            .services
            .cash_memos
            .list_cash_memos_paged(year, params.page, params.limit, params.search)
            .await?,
    ))
}

pub async fn get_cash_memo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<CashMemoDetail>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.cash_memos.get_cash_memo(year, id).await?))
}

pub async fn get_by_lr_id(
    State(state): State<AppState>,
    Path(lr_id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<CashMemoDetail>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.cash_memos.get_by_lr_id(year, lr_id).await?))
}

pub async fn create_cash_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<CashMemoPayload>,
) -> Result<(StatusCode, Json<CashMemoCreated>), ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    let created = state
        .services
        .cash_memos
        .create_cash_memo(year, payload, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_cash_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<CashMemoPayload>,
) -> Result<Json<CashMemoDetail>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(
        state
            .services
            .cash_memos
            .update_cash_memo(year, id, payload, &user)
            .await?,
    ))
}

pub async fn delete_cash_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<StatusCode, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    state
        .services
        .cash_memos
        .delete_cash_memo(year, id, &user)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
