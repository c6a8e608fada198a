use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{resolve_year, YearQuery},
    services::memos::{
        MemoCascadeSummary, MemoDetails, MemoListPage, MemoPayload, MemoResponse,
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
pub struct MemoListParams {
    pub year: Option<i32>,
    #[serde(default = "crate::handlers::common::default_page")]
    pub page: u64,
    #[serde(default = "crate::handlers::common::default_limit")]
    pub limit: u64,
    pub search: Option<String>,
    pub sort_order: Option<String>,
}

pub async fn list_memos(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MemoResponse>>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.memos.list_memos(year).await?))
}

pub async fn list_memos_paged(
    State(state): State<AppState>,
    Query(params): Query<MemoListParams>,
) -> Result<Json<MemoListPage>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let ascending = params
        .sort_order
        .as_deref()
        .map(|o| o.eq_ignore_ascii_case("asc"))
        .unwrap_or(false);
    let page = state
        .services
        .memos
        .list_memos_paged(year, params.page, params.limit, params.search, ascending)
        .await?;
    Ok(Json(page))
}

pub async fn lookup_memo(
    State(state): State<AppState>,
    Path(memo_no): Path<String>,
    Query(query): Query<YearQuery>,
) -> Result<Json<MemoDetails>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.memos.lookup_memo(year, &memo_no).await?))
}

pub async fn get_memo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<MemoResponse>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.memos.get_memo(year, id).await?))
}

pub async fn memo_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<MemoDetails>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.memos.memo_details(year, id).await?))
}

pub async fn create_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<MemoPayload>,
) -> Result<(StatusCode, Json<MemoResponse>), ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    let created = state
        .services
        .memos
        .create_memo(year, payload, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
    Json(payload): Json<MemoPayload>,
) -> Result<Json<MemoResponse>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(
        state
            .services
            .memos
            .update_memo(year, id, payload, &user)
            .await?,
    ))
}

pub async fn delete_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> Result<Json<MemoCascadeSummary>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(
        state.services.memos.delete_memo(year, id, &user).await?,
    ))
}
