use crate::{
    auth::{AuthService, AuthUser},
    db::DbPool,
    entities::app_key::{self, Entity as AppKeyEntity, Model as AppKeyModel},
    errors::ServiceError,
    services::audit::{AuditEntry, AuditService},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// The one key type currently issued. Destructive front-office actions ask
/// for it before the request is sent.
pub const KEY_TYPE_DELETE: &str = "delete";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetAppKeyRequest {
    #[validate(length(min = 4, max = 100, message = "Key must be 4 to 100 characters"))]
    pub key: String,
    #[serde(default)]
    pub usage_limit: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateAppKeyRequest {
    #[validate(length(min = 1, message = "Key is required"))]
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppKeyValidation {
    pub valid: bool,
}

/// Status view without the hash, for the admin screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct AppKeyStatus {
    pub configured: bool,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub exhausted: bool,
}

#[derive(Clone)]
pub struct AppKeyService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
    audit: AuditService,
}

impl AppKeyService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>, audit: AuditService) -> Self {
        Self {
            db_pool,
            auth,
            audit,
        }
    }

    /// Sets or replaces the key. Replacing resets the usage counter.
    #[instrument(skip(self, request, actor))]
    pub async fn set_key(
        &self,
        request: SetAppKeyRequest,
        actor: &AuthUser,
    ) -> Result<AppKeyStatus, ServiceError> {
        request.validate()?;

        if let Some(limit) = request.usage_limit {
            if limit <= 0 {
                return Err(ServiceError::ValidationError(
                    "Usage limit must be positive".to_string(),
                ));
            }
        }

        let key_hash = self
            .auth
            .hash_secret(&request.key)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        let now = Utc::now();

        let updated = match self.find_key().await? {
            Some(existing) => {
                let mut model: app_key::ActiveModel = existing.into();
                model.key_hash = Set(key_hash);
                model.usage_limit = Set(request.usage_limit);
                model.usage_count = Set(0);
                model.updated_by = Set(Some(actor.username.clone()));
                model.updated_at = Set(Some(now));
                model.update(&*self.db_pool).await?
            }
            None => {
                let model = app_key::ActiveModel {
                    key_type: Set(KEY_TYPE_DELETE.to_string()),
                    key_hash: Set(key_hash),
                    usage_limit: Set(request.usage_limit),
                    usage_count: Set(0),
                    updated_by: Set(Some(actor.username.clone())),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                };
                model.insert(&*self.db_pool).await?
            }
        };

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "appkey")
                    .details(match updated.usage_limit {
                        Some(limit) => format!("key set, usage limit {}", limit),
                        None => "key set, no usage limit".to_string(),
                    }),
            )
            .await;

        Ok(status_of(Some(updated)))
    }

    /// Checks a presented key against the stored hash. Each successful check
    /// consumes one use when a limit is configured.
    #[instrument(skip(self, request, actor))]
    pub async fn validate_key(
        &self,
        request: ValidateAppKeyRequest,
        actor: &AuthUser,
    ) -> Result<AppKeyValidation, ServiceError> {
        request.validate()?;

        let Some(stored) = self.find_key().await? else {
            return Err(ServiceError::BadRequest(
                "No application key is configured".to_string(),
            ));
        };

        if let Some(limit) = stored.usage_limit {
            if stored.usage_count >= limit {
                warn!(username = %actor.username, "app key usage limit exhausted");
                return Err(ServiceError::Forbidden);
            }
        }

        if !self.auth.verify_secret(&request.key, &stored.key_hash) {
            self.audit
                .record(
                    AuditEntry::new(&actor.username, "validate", "appkey")
                        .details("key rejected"),
                )
                .await;
            return Ok(AppKeyValidation { valid: false });
        }

        let count = stored.usage_count;
        let mut model: app_key::ActiveModel = stored.into();
        model.usage_count = Set(count + 1);
        model.update(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "validate", "appkey")
                    .details("key accepted"),
            )
            .await;

        Ok(AppKeyValidation { valid: true })
    }

    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<AppKeyStatus, ServiceError> {
        Ok(status_of(self.find_key().await?))
    }

    async fn find_key(&self) -> Result<Option<AppKeyModel>, ServiceError> {
        Ok(AppKeyEntity::find()
            .filter(app_key::Column::KeyType.eq(KEY_TYPE_DELETE))
            .one(&*self.db_pool)
            .await?)
    }
}

fn status_of(key: Option<AppKeyModel>) -> AppKeyStatus {
    match key {
        Some(key) => AppKeyStatus {
            configured: true,
            exhausted: key
                .usage_limit
                .map(|limit| key.usage_count >= limit)
                .unwrap_or(false),
            usage_limit: key.usage_limit,
            usage_count: key.usage_count,
        },
        None => AppKeyStatus {
            configured: false,
            usage_limit: None,
            usage_count: 0,
            exhausted: false,
        },
    }
}
