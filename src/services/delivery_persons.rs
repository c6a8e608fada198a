use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::delivery_person::{self, Entity as DeliveryPersonEntity, Model as DeliveryPersonModel},
    errors::ServiceError,
    services::audit::{AuditEntry, AuditService},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeliveryPersonPayload {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone)]
pub struct DeliveryPersonService {
    db_pool: Arc<DbPool>,
    audit: AuditService,
}

impl DeliveryPersonService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditService) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DeliveryPersonModel>, ServiceError> {
        Ok(DeliveryPersonEntity::find()
            .order_by_asc(delivery_person::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, payload, actor), fields(name = %payload.name))]
    pub async fn create(
        &self,
        payload: DeliveryPersonPayload,
        actor: &AuthUser,
    ) -> Result<DeliveryPersonModel, ServiceError> {
        payload.validate()?;
        let name = payload.name.trim().to_string();

        if self.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::Duplicate(format!(
                "Delivery person {}",
                name
            )));
        }

        let model = delivery_person::ActiveModel {
            name: Set(name.clone()),
            is_active: Set(payload.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = model
            .insert(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("Delivery person {}", name)))?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "create", "delivery_person")
                    .entity_no(&inserted.name)
                    .new_data(serde_json::to_value(&inserted).unwrap_or_default()),
            )
            .await;

        Ok(inserted)
    }

    #[instrument(skip(self, payload, actor), fields(id))]
    pub async fn update(
        &self,
        id: i32,
        payload: DeliveryPersonPayload,
        actor: &AuthUser,
    ) -> Result<DeliveryPersonModel, ServiceError> {
        payload.validate()?;
        let name = payload.name.trim().to_string();

        let existing = self.find(id).await?;
        let old_snapshot = serde_json::to_value(&existing).unwrap_or_default();

        if let Some(other) = self.find_by_name(&name).await? {
            if other.id != id {
                return Err(ServiceError::Duplicate(format!(
                    "Delivery person {}",
                    name
                )));
            }
        }

        let mut model: delivery_person::ActiveModel = existing.into();
        model.name = Set(name.clone());
        model.is_active = Set(payload.is_active);

        let updated = model
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_db(e, &format!("Delivery person {}", name)))?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "update", "delivery_person")
                    .entity_no(&updated.name)
                    .old_data(old_snapshot)
                    .new_data(serde_json::to_value(&updated).unwrap_or_default()),
            )
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(id))]
    pub async fn delete(&self, id: i32, actor: &AuthUser) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;
        let snapshot = serde_json::to_value(&existing).unwrap_or_default();
        let name = existing.name.clone();

        existing.delete(&*self.db_pool).await?;

        self.audit
            .record(
                AuditEntry::new(&actor.username, "delete", "delivery_person")
                    .entity_no(&name)
                    .old_data(snapshot),
            )
            .await;

        Ok(())
    }

    async fn find(&self, id: i32) -> Result<DeliveryPersonModel, ServiceError> {
        DeliveryPersonEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery person".to_string()))
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DeliveryPersonModel>, ServiceError> {
        Ok(DeliveryPersonEntity::find()
            .filter(delivery_person::Column::Name.eq(name))
            .one(&*self.db_pool)
            .await?)
    }
}
