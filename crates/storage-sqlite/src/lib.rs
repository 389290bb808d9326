//! SQLite storage implementation for the AutoSave ledger engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `autosave-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core
//! crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!      storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```
//!
//! All writes go through a single writer actor, each job in its own
//! immediate transaction. A ledger commit is one such job.

pub mod db;
pub mod errors;
pub mod schema;
pub mod store;
mod utils;

// Repository implementations
pub mod accounts;
pub mod goals;
pub mod ledger;
pub mod loans;
pub mod operations;
pub mod settings;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};
pub use store::SqliteStore;

// Re-export from autosave-core for convenience
pub use autosave_core::errors::{DatabaseError, Error, Result};
