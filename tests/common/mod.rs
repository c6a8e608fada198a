//! Shared fixture for integration tests: an in-memory SQLite database with
//! the full schema applied, plus ready-made payloads and actors.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use freightbook_api::{
    auth::{AuthConfig, AuthService, AuthUser},
    migrator::Migrator,
    services::{
        cash_memos::CashMemoPayload, lorry_receipts::LrPayload, memos::MemoPayload, AppServices,
    },
};

pub const TEST_YEAR: i32 = 2024;

pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl TestApp {
    /// Fresh schema on a private in-memory database per test. The pool is
    /// capped at one connection so every task sees the same memory database.
    pub async fn new() -> Self {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.expect("in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations");

        let db = Arc::new(db);
        let auth = Arc::new(AuthService::new(AuthConfig::new(
            "k9EjR2mXv7QpLw4ZtYhN8cBgA5sDuF6iOeT1rJ3nMqWxVbK0yHdGzPfCaUlS_test".to_string(),
            Duration::from_secs(3600),
        )));
        let services = AppServices::new(db.clone(), auth.clone());

        services
            .years
            .ensure_year(TEST_YEAR)
            .await
            .expect("register test year");

        Self { db, services, auth }
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: 1,
        username: "admin".to_string(),
        role: "admin".to_string(),
        token_id: "test-token-admin".to_string(),
    }
}

pub fn clerk() -> AuthUser {
    AuthUser {
        user_id: 2,
        username: "clerk1".to_string(),
        role: "clerk".to_string(),
        token_id: "test-token-clerk".to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn memo_payload(memo_no: &str) -> MemoPayload {
    MemoPayload {
        memo_no: memo_no.to_string(),
        memo_date: date(2024, 6, 10),
        arrival_date: date(2024, 6, 12),
        arrival_time: None,
        truck_no: "GJ-01-AB-1234".to_string(),
        driver_owner: Some("R. Patel".to_string()),
        total_lorry_hire: Some(dec!(12000)),
        advance_lorry_hire: Some(dec!(5000)),
    }
}

pub fn lr_payload(memo_id: i32, lr_no: &str) -> LrPayload {
    LrPayload {
        memo_id,
        lr_no: lr_no.to_string(),
        lr_date: date(2024, 6, 9),
        from_city: "Mumbai".to_string(),
        to_city: "Rajkot".to_string(),
        consignor: Some("Acme Textiles".to_string()),
        consignee: Some("Shree Traders".to_string()),
        pkgs: Some(10),
        content: Some("Cloth bales".to_string()),
        freight_type: "Topay".to_string(),
        freight: Some(dec!(1500)),
        weight: Some(dec!(850)),
        dd_rate: None,
        dd_total: None,
        pm_no: None,
        refund: None,
        remarks: None,
    }
}

pub fn cash_memo_payload(lr_id: i32) -> CashMemoPayload {
    CashMemoPayload {
        lr_id,
        hamali: Some(dec!(50)),
        bc: Some(dec!(5)),
        landing: Some(dec!(20)),
        lc: Some(dec!(10)),
    }
}
