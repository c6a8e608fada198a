use crate::{
    db::DbPool,
    entities::audit_log::{self, Entity as AuditLogEntity},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

const DEFAULT_PAGE_LIMIT: u64 = 50;
const MAX_PAGE_LIMIT: u64 = 200;

/// One entry to be written to the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub user: String,
    pub action: String,
    pub entity: String,
    pub entity_no: Option<String>,
    pub year: Option<i32>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(user: &str, action: &str, entity: &str) -> Self {
        Self {
            user: user.to_string(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_no: None,
            year: None,
            old_data: None,
            new_data: None,
            details: None,
        }
    }

    pub fn entity_no(mut self, no: impl ToString) -> Self {
        self.entity_no = Some(no.to_string());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn old_data(mut self, data: serde_json::Value) -> Self {
        self.old_data = Some(data);
        self
    }

    pub fn new_data(mut self, data: serde_json::Value) -> Self {
        self.new_data = Some(data);
        self
    }

    pub fn details(mut self, details: impl ToString) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLogPage {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub results: Vec<audit_log::Model>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// Append-only audit writer. Recording never fails the calling operation:
/// write errors are logged and dropped.
#[derive(Clone)]
pub struct AuditService {
    db_pool: Arc<DbPool>,
}

impl AuditService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Writes one audit row. Infallible by contract.
    #[instrument(skip(self, entry), fields(action = %entry.action, entity = %entry.entity))]
    pub async fn record(&self, entry: AuditEntry) {
        let model = audit_log::ActiveModel {
            user: Set(entry.user),
            action: Set(entry.action),
            entity: Set(entry.entity),
            entity_no: Set(entry.entity_no),
            year: Set(entry.year),
            old_data: Set(entry.old_data),
            new_data: Set(entry.new_data),
            details: Set(entry.details),
            timestamp: Set(Utc::now()),
            ..Default::default()
        };

        if let Err(e) = model.insert(&*self.db_pool).await {
            warn!(error = %e, "failed to write audit log entry; continuing");
        }
    }

    /// Paginated read of the trail for one fiscal year, newest first.
    /// `limit` is clamped to 1..=200.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        year: i32,
        page: u64,
        limit: u64,
    ) -> Result<AuditLogPage, ServiceError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);

        let paginator = AuditLogEntity::find()
            .filter(audit_log::Column::Year.eq(year))
            .order_by_desc(audit_log::Column::Timestamp)
            .paginate(&*self.db_pool, limit);

        let total = paginator.num_items().await?;
        let results = paginator.fetch_page(page - 1).await?;

        Ok(AuditLogPage {
            total,
            page,
            limit,
            results,
            total_pages: total.div_ceil(limit),
        })
    }

    pub fn default_limit() -> u64 {
        DEFAULT_PAGE_LIMIT
    }
}
