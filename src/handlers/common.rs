use crate::{errors::ServiceError, fiscal, AppState};
use serde::Deserialize;
use utoipa::IntoParams;

/// `?year=` parameter shared by every year-scoped route.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Resolves the requested fiscal year (default: the current one) and makes
/// sure its registry row and sequence counter exist.
pub async fn resolve_year(state: &AppState, param: Option<i32>) -> Result<i32, ServiceError> {
    let year = fiscal::resolve_year(param);
    state.services.years.ensure_year(year).await?;
    Ok(year)
}

/// Default page and page size shared by the paginated listings.
pub fn default_page() -> u64 {
    1
}

pub fn default_limit() -> u64 {
    20
}
