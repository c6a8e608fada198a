use crate::{
    auth::{policy, AuthService, AuthUser, IssuedToken},
    db::DbPool,
    entities::user::{self, Entity as UserEntity, Model as UserModel},
    errors::ServiceError,
    services::audit::{AuditEntry, AuditService},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserModel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
    audit: AuditService,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>, audit: AuditService) -> Self {
        Self {
            db_pool,
            auth,
            audit,
        }
    }

    /// Verifies credentials and issues a token. Unknown usernames and wrong
    /// passwords return the same error.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request.validate()?;

        let user = UserEntity::find()
            .filter(user::Column::Username.eq(request.username.trim()))
            .one(&*self.db_pool)
            .await?
            .ok_or(ServiceError::AuthError(
                "Invalid username or password".to_string(),
            ))?;

        if !self.auth.verify_secret(&request.password, &user.password_hash) {
            warn!(username = %user.username, "failed login attempt");
            return Err(ServiceError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let IssuedToken { token, expires_in } = self
            .auth
            .generate_token(&user)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        info!(username = %user.username, role = %user.role, "user logged in");

        Ok(LoginResponse {
            token,
            expires_in,
            user,
        })
    }

    #[instrument(skip(self, request, actor), fields(username = %request.username))]
    pub async fn register(
        &self,
        request: RegisterRequest,
        actor: &AuthUser,
    ) -> Result<UserModel, ServiceError> {
        request.validate()?;

        if !policy::is_known_role(&request.role) {
            return Err(ServiceError::BadRequest(format!(
                "Unknown role: {}",
                request.role
            )));
        }

        let username = request.username.trim().to_string();
        let password_hash = self
            .auth
            .hash_secret(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let model = user::ActiveModel {
            username: Set(username.clone()),
            password_hash: Set(password_hash),
            role: Set(request.role.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = model
            .insert(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("User {}", username)))?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "create", "user")
                    .entity_no(&inserted.username)
                    .details(format!("role {}", inserted.role)),
            )
            .await;

        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<UserModel, ServiceError> {
        UserEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&*self.db_pool)
            .await?)
    }

    /// Changes a user's role. The last admin cannot be demoted.
    #[instrument(skip(self, request, actor), fields(user_id = id))]
    pub async fn update_role(
        &self,
        id: i32,
        request: UpdateRoleRequest,
        actor: &AuthUser,
    ) -> Result<UserModel, ServiceError> {
        if !policy::is_known_role(&request.role) {
            return Err(ServiceError::BadRequest(format!(
                "Unknown role: {}",
                request.role
            )));
        }

        let existing = self.get_user(id).await?;

        if existing.role == policy::ROLE_ADMIN && request.role != policy::ROLE_ADMIN {
            let admin_count = UserEntity::find()
                .filter(user::Column::Role.eq(policy::ROLE_ADMIN))
                .count(&*self.db_pool)
                .await?;
            if admin_count <= 1 {
                return Err(ServiceError::BadRequest(
                    "Cannot demote the only admin".to_string(),
                ));
            }
        }

        let username = existing.username.clone();
        let old_role = existing.role.clone();

        let mut model: user::ActiveModel = existing.into();
        model.role = Set(request.role.clone());
        let updated = model.update(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "user")
                    .entity_no(&username)
                    .details(format!("role {} to {}", old_role, updated.role)),
            )
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, request, actor), fields(user_id = id))]
    pub async fn update_password(
        &self,
        id: i32,
        request: UpdatePasswordRequest,
        actor: &AuthUser,
    ) -> Result<(), ServiceError> {
        request.validate()?;

        let existing = self.get_user(id).await?;
        let username = existing.username.clone();

        let password_hash = self
            .auth
            .hash_secret(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let mut model: user::ActiveModel = existing.into();
        model.password_hash = Set(password_hash);
        model.update(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "user")
                    .entity_no(&username)
                    .details("password changed"),
            )
            .await;

        Ok(())
    }

    /// Deletes a user. Self-deletion and removing the last admin are refused.
    #[instrument(skip(self, actor), fields(user_id = id))]
    pub async fn delete_user(&self, id: i32, actor: &AuthUser) -> Result<(), ServiceError> {
        if id == actor.user_id {
            return Err(ServiceError::BadRequest(
                "Cannot delete your own account".to_string(),
            ));
        }

        let existing = self.get_user(id).await?;

        if existing.role == policy::ROLE_ADMIN {
            let admin_count = UserEntity::find()
                .filter(user::Column::Role.eq(policy::ROLE_ADMIN))
                .count(&*self.db_pool)
                .await?;
            if admin_count <= 1 {
                return Err(ServiceError::BadRequest(
                    "Cannot delete the only admin".to_string(),
                ));
            }
        }

        let username = existing.username.clone();
        existing.delete(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "delete", "user").entity_no(&username),
            )
            .await;

        Ok(())
    }

    /// Seeds the first admin account when the users table is empty. Runs at
    /// startup and is a no-op on every later boot.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), ServiceError> {
        let existing = UserEntity::find().count(&*self.db_pool).await?;
        if existing > 0 {
            return Ok(());
        }

        let password_hash = self
            .auth
            .hash_secret(password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let model = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(policy::ROLE_ADMIN.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(&*self.db_pool).await?;

        info!(username, "bootstrap admin account created");
        Ok(())
    }
}
