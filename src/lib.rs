//! Freightbook API Library
//!
//! Back-office bookkeeping service for a transport company: arrival memos,
//! lorry receipts, and cash memos, partitioned by Indian fiscal year.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod fiscal;
pub mod handlers;
pub mod ledger;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::perm;
use crate::auth::AuthRouterExt;

/// Shared application state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
    pub auth: Arc<auth::AuthService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(auth::AuthService::new(auth::AuthConfig::from(&config)));
        let services = services::AppServices::new(db.clone(), auth.clone());
        Self {
            db,
            config,
            services,
            auth,
        }
    }
}

/// All API routes below `/api`, permission-gated per (resource, action).
pub fn api_routes() -> Router<AppState> {
    // Account routes. `/login` is the only unauthenticated one here.
    let session = Router::new().route("/login", post(handlers::auth::login));
    let me = Router::new().route("/me", get(handlers::auth::me)).with_auth();
    let user_admin = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/users", get(handlers::auth::list_users))
        .route("/users/:id/role", put(handlers::auth::update_role))
        .route("/users/:id/password", put(handlers::auth::update_password))
        .route("/users/:id", delete(handlers::auth::delete_user))
        .with_permission(perm::USERS_MANAGE);

    // Memos
    let memos_read = Router::new()
        .route("/memos", get(handlers::memos::list_memos))
        .route("/memos/list", get(handlers::memos::list_memos_paged))
        .route("/memos/lookup/:no", get(handlers::memos::lookup_memo))
        .route("/memos/:id", get(handlers::memos::get_memo))
        .route("/memos/:id/details", get(handlers::memos::memo_details))
        .with_permission(perm::MEMOS_READ);
    let memos_create = Router::new()
        .route("/memos", post(handlers::memos::create_memo))
        .with_permission(perm::MEMOS_CREATE);
    let memos_update = Router::new()
        .route("/memos/:id", put(handlers::memos::update_memo))
        .with_permission(perm::MEMOS_UPDATE);
    let memos_delete = Router::new()
        .route("/memos/:id", delete(handlers::memos::delete_memo))
        .with_permission(perm::MEMOS_DELETE);

    // Lorry receipts
    let lrs_read = Router::new()
        .route("/lrs", get(handlers::lorry_receipts::list_lrs))
        .route("/lrs/search", get(handlers::lorry_receipts::search_lrs))
        .route("/lrs/lookup/:no", get(handlers::lorry_receipts::lookup_lr))
        .route("/lrs/by-lr-no/:no", get(handlers::lorry_receipts::lookup_lr))
        .route(
            "/lrs/by-cash-memo/:no",
            get(handlers::lorry_receipts::get_by_cash_memo_no),
        )
        .route("/lrs/:id", get(handlers::lorry_receipts::get_lr))
        .route("/lrs/:id/details", get(handlers::lorry_receipts::lr_details))
        .with_permission(perm::LRS_READ);
    let lrs_create = Router::new()
        .route("/lrs", post(handlers::lorry_receipts::create_lr))
        .with_permission(perm::LRS_CREATE);
    let lrs_update = Router::new()
        .route("/lrs/:id", put(handlers::lorry_receipts::update_lr))
        .with_permission(perm::LRS_UPDATE);
    let lrs_delete = Router::new()
        .route("/lrs/:id", delete(handlers::lorry_receipts::delete_lr))
        .with_permission(perm::LRS_DELETE);
    let lrs_deliver = Router::new()
        .route(
            "/lrs/mark-delivered",
            post(handlers::lorry_receipts::mark_delivered),
        )
        .with_permission(perm::LRS_DELIVER);

    // Cash memos
    let cash_memos_read = Router::new()
        .route("/cashmemos", get(handlers::cash_memos::list_cash_memos))
        .route(
            "/cashmemos/list",
            get(handlers::cash_memos::list_cash_memos_paged),
        )
        .route(
            "/cashmemos/by-lr-id/:lr_id",
            get(handlers::cash_memos::get_by_lr_id),
        )
        .route("/cashmemos/:id", get(handlers::cash_memos::get_cash_memo))
        .with_permission(perm::CASH_MEMOS_READ);
    let cash_memos_create = Router::new()
        .route("/cashmemos", post(handlers::cash_memos::create_cash_memo))
        .with_permission(perm::CASH_MEMOS_CREATE);
    let cash_memos_update = Router::new()
        .route(
            "/cashmemos/:id",
            put(handlers::cash_memos::update_cash_memo),
        )
        .with_permission(perm::CASH_MEMOS_UPDATE);
    let cash_memos_delete = Router::new()
        .route(
            "/cashmemos/:id",
            delete(handlers::cash_memos::delete_cash_memo),
        )
        .with_permission(perm::CASH_MEMOS_DELETE);

    // Delivery persons
    let delivery_persons_read = Router::new()
        .route(
            "/delivery-persons",
            get(handlers::delivery_persons::list_delivery_persons),
        )
        .with_permission(perm::DELIVERY_PERSONS_READ);
    let delivery_persons_create = Router::new()
        .route(
            "/delivery-persons",
            post(handlers::delivery_persons::create_delivery_person),
        )
        .with_permission(perm::DELIVERY_PERSONS_CREATE);
    let delivery_persons_update = Router::new()
        .route(
            "/delivery-persons/:id",
            put(handlers::delivery_persons::update_delivery_person),
        )
        .with_permission(perm::DELIVERY_PERSONS_UPDATE);
    let delivery_persons_delete = Router::new()
        .route(
            "/delivery-persons/:id",
            delete(handlers::delivery_persons::delete_delivery_person),
        )
        .with_permission(perm::DELIVERY_PERSONS_DELETE);

    // Suggestions
    let suggestions_read = Router::new()
        .route(
            "/suggestions/:type",
            get(handlers::suggestions::list_suggestions),
        )
        .with_permission(perm::SUGGESTIONS_READ);
    let suggestions_create = Router::new()
        .route(
            "/suggestions/:type",
            post(handlers::suggestions::add_suggestion),
        )
        .with_permission(perm::SUGGESTIONS_CREATE);

    // Years
    let years_read = Router::new()
        .route("/years", get(handlers::years::list_years))
        .with_permission(perm::YEARS_READ);
    let years_manage = Router::new()
        .route("/year-admin/add", post(handlers::years::add_year))
        .with_permission(perm::YEARS_MANAGE);

    // Reports
    let reports = Router::new()
        .route(
            "/reports/door-delivery",
            get(handlers::reports::door_delivery_report),
        )
        .route("/reports/truck", get(handlers::reports::truck_report))
        .route("/reports/monthly", get(handlers::reports::monthly_report))
        .route("/reports/refund", get(handlers::reports::refund_report))
        .route(
            "/reports/no-cash-memo",
            get(handlers::reports::no_cash_memo_report),
        )
        .route("/reports/delivery", get(handlers::reports::delivery_report))
        .with_permission(perm::REPORTS_READ);

    // Audit log
    let audit_log = Router::new()
        .route("/auditlog", get(handlers::audit_log::list_audit_log))
        .with_permission(perm::AUDIT_LOG_READ);

    // App keys
    let app_key_manage = Router::new()
        .route("/admin/app-key", post(handlers::app_keys::set_app_key))
        .with_permission(perm::APP_KEYS_MANAGE);
    let app_key_validate = Router::new()
        .route(
            "/app-key/validate",
            post(handlers::app_keys::validate_app_key),
        )
        .with_permission(perm::APP_KEYS_VALIDATE);
    let app_key_status = Router::new()
        .route("/app-key/status", get(handlers::app_keys::app_key_status))
        .with_permission(perm::APP_KEYS_STATUS);

    // Dashboard
    let dashboard = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard_summary))
        .with_permission(perm::DASHBOARD_READ);

    Router::new()
        .merge(session)
        .merge(me)
        .merge(user_admin)
        .merge(memos_read)
        .merge(memos_create)
        .merge(memos_update)
        .merge(memos_delete)
        .merge(lrs_read)
        .merge(lrs_create)
        .merge(lrs_update)
        .merge(lrs_delete)
        .merge(lrs_deliver)
        .merge(cash_memos_read)
        .merge(cash_memos_create)
        .merge(cash_memos_update)
        .merge(cash_memos_delete)
        .merge(delivery_persons_read)
        .merge(delivery_persons_create)
        .merge(delivery_persons_update)
        .merge(delivery_persons_delete)
        .merge(suggestions_read)
        .merge(suggestions_create)
        .merge(years_read)
        .merge(years_manage)
        .merge(reports)
        .merge(audit_log)
        .merge(app_key_manage)
        .merge(app_key_validate)
        .merge(app_key_status)
        .merge(dashboard)
}

/// Full application router: `/api` routes, swagger, and the auth service
/// extension the bearer-token middleware reads.
pub fn app_router(state: AppState) -> Router {
    let auth = state.auth.clone();
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        .merge(openapi::swagger_routes())
        .layer(axum::Extension(auth))
        .with_state(state)
}
