use crate::{
    auth::AuthUser,
    entities::user::Model as UserModel,
    errors::ServiceError,
    services::users::{
        LoginRequest, LoginResponse, RegisterRequest, UpdatePasswordRequest, UpdateRoleRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub role: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    Ok(Json(state.services.users.login(request).await?))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserModel>), ServiceError> {
    let created = state.services.users.register(request, &user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.user_id,
        username: user.username,
        role: user.role,
    })
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserModel>>, ServiceError> {
    Ok(Json(state.services.users.list_users().await?))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserModel>, ServiceError> {
    Ok(Json(
        state.services.users.update_role(id, request, &user).await?,
    ))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .users
        .update_password(id, request, &user)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.users.delete_user(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
