use crate::{
    errors::ServiceError,
    services::suggestions::{SuggestionAdded, SuggestionKind},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSuggestionRequest {
    pub name: String,
}

pub async fn list_suggestions(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<String>>, ServiceError> {
    let kind: SuggestionKind = kind.parse()?;
    Ok(Json(state.services.suggestions.list(kind, &query.q).await?))
}

pub async fn add_suggestion(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<AddSuggestionRequest>,
) -> Result<Json<SuggestionAdded>, ServiceError> {
    let kind: SuggestionKind = kind.parse()?;
    Ok(Json(
        state.services.suggestions.add(kind, &request.name).await?,
    ))
}
