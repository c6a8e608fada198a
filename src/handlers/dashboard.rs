use crate::{
    errors::ServiceError,
    handlers::common::{resolve_year, YearQuery},
    services::dashboard::DashboardSummary,
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};

pub async fn dashboard_summary(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    let year = resolve_year(&state, query.year).await?;
    Ok(Json(state.services.dashboard.summary(year).await?))
}
