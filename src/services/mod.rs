// Bookkeeping services
pub mod cash_memos;
pub mod lorry_receipts;
pub mod memos;

// Sequence numbers and the year registry
pub mod sequence;
pub mod years;

// Lookups and reporting
pub mod dashboard;
pub mod delivery_persons;
pub mod reports;
pub mod suggestions;

// Accounts and access
pub mod app_keys;
pub mod users;

// Audit trail
pub mod audit;

use crate::{auth::AuthService, db::DbPool};
use std::sync::Arc;

/// All services behind one handle, cloned into handler state.
#[derive(Clone)]
pub struct AppServices {
    pub memos: memos::MemoService,
    pub lrs: lorry_receipts::LrService,
    pub cash_memos: cash_memos::CashMemoService,
    pub delivery_persons: delivery_persons::DeliveryPersonService,
    pub suggestions: suggestions::SuggestionService,
    pub years: years::YearService,
    pub reports: reports::ReportService,
    pub dashboard: dashboard::DashboardService,
    pub users: users::UserService,
    pub app_keys: app_keys::AppKeyService,
    pub audit: audit::AuditService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        let audit = audit::AuditService::new(db_pool.clone());
        Self {
            memos: memos::MemoService::new(db_pool.clone(), audit.clone()),
            lrs: lorry_receipts::LrService::new(db_pool.clone(), audit.clone()),
            cash_memos: cash_memos::CashMemoService::new(db_pool.clone(), audit.clone()),
            delivery_persons: delivery_persons::DeliveryPersonService::new(
                db_pool.clone(),
                audit.clone(),
            ),
            suggestions: suggestions::SuggestionService::new(db_pool.clone()),
            years: years::YearService::new(db_pool.clone()),
            reports: reports::ReportService::new(db_pool.clone()),
            dashboard: dashboard::DashboardService::new(db_pool.clone()),
            users: users::UserService::new(db_pool.clone(), auth.clone(), audit.clone()),
            app_keys: app_keys::AppKeyService::new(db_pool, auth, audit.clone()),
            audit,
        }
    }
}
