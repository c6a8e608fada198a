use crate::{
    auth::AuthUser,
    entities::delivery_person::Model as DeliveryPersonModel,
    errors::ServiceError,
    services::delivery_persons::DeliveryPersonPayload,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};

pub async fn list_delivery_persons(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryPersonModel>>, ServiceError> {
    Ok(Json(state.services.delivery_persons.list().await?))
}

pub async fn create_delivery_person(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DeliveryPersonPayload>,
) -> Result<(StatusCode, Json<DeliveryPersonModel>), ServiceError> {
    let created = state
        .services
        .delivery_persons
        .create(payload, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_delivery_person(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<DeliveryPersonPayload>,
) -> Result<Json<DeliveryPersonModel>, ServiceError> {
    Ok(Json(
        state
            .services
            .delivery_persons
            .update(id, payload, &user)
            .await?,
    ))
}

pub async fn delete_delivery_person(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.delivery_persons.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
