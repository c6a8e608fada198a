use crate::{
    errors::ServiceError,
    handlers::common::resolve_year,
    services::audit::{AuditLogPage, AuditService},
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub year: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
}

fn default_page() -> u64 {
    1
}

pub async fn list_audit_log(
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> Result<Json<AuditLogPage>, ServiceError> {
    let year = resolve_year(&state, params.year).await?;
    let limit = params.limit.unwrap_or_else(AuditService::default_limit);
    Ok(Json(
        state.services.audit.list(year, params.page, limit).await?,
    ))
}
