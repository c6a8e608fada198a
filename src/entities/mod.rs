pub mod app_key;
pub mod audit_log;
pub mod cash_memo;
pub mod cash_memo_sequence;
pub mod delivery_person;
pub mod fiscal_year;
pub mod lorry_receipt;
pub mod memo;
pub mod suggestion;
pub mod user;
