use crate::{auth::AuthUser, errors::ServiceError, services::audit::AuditEntry, AppState};
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddYearRequest {
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct YearsResponse {
    pub years: Vec<i32>,
}

pub async fn list_years(
    State(state): State<AppState>,
) -> Result<Json<YearsResponse>, ServiceError> {
    Ok(Json(YearsResponse {
        years: state.services.years.list_years().await?,
    }))
}

pub async fn add_year(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AddYearRequest>,
) -> Result<StatusCode, ServiceError> {
    state.services.years.add_year(request.year).await?;
    state
        .services
        .audit
        .record(
            AuditEntry::new(&user.username, "create", "year")
                .entity_no(request.year)
                .year(request.year),
        )
        .await;
    Ok(StatusCode::CREATED)
}
