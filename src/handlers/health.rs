use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// Liveness plus a database round trip.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = crate::db::check_connection(&state.db).await.is_ok();
    let (status, database, code) = if db_ok {
        ("ok", "up", StatusCode::OK)
    } else {
        ("degraded", "down", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
