pub mod app_keys;
pub mod audit_log;
pub mod auth;
pub mod cash_memos;
pub mod common;
pub mod dashboard;
pub mod delivery_persons;
pub mod health;
pub mod lorry_receipts;
pub mod memos;
pub mod reports;
pub mod suggestions;
pub mod years;
