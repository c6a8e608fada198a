use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::app_keys::{
        AppKeyStatus, AppKeyValidation, SetAppKeyRequest, ValidateAppKeyRequest,
    },
    AppState,
};
use axum::{extract::State, response::Json, Extension};

pub async fn set_app_key(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SetAppKeyRequest>,
) -> Result<Json<AppKeyStatus>, ServiceError> {
    Ok(Json(state.services.app_keys.set_key(request, &user).await?))
}

pub async fn validate_app_key(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ValidateAppKeyRequest>,
) -> Result<Json<AppKeyValidation>, ServiceError> {
    Ok(Json(
        state.services.app_keys.validate_key(request, &user).await?,
    ))
}

pub async fn app_key_status(
    State(state): State<AppState>,
) -> Result<Json<AppKeyStatus>, ServiceError> {
    Ok(Json(state.services.app_keys.status().await?))
}
