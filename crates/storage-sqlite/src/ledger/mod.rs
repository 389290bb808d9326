//! SQLite implementation of the atomic ledger commit.

mod repository;

pub use repository::LedgerRepository;
