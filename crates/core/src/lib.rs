//! AutoSave Core - Domain entities, services, and traits.
//!
//! This crate contains the ledger rules that keep goal balances, account
//! balances, deposit and payment history, and the operation log consistent.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate and by the in-memory backend in [`memory`].

pub mod accounts;
pub mod capacity;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod ledger;
pub mod loans;
pub mod memory;
pub mod operations;
pub mod settings;
pub mod transfers;
pub mod utils;
pub mod withdrawals;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
