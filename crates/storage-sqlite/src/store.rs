//! One-call wiring of every SQLite repository over a shared pool and writer.

use log::info;
use std::sync::Arc;

use autosave_core::errors::Result;

use crate::accounts::AccountRepository;
use crate::db::{self, DbPool, WriteHandle};
use crate::goals::GoalRepository;
use crate::ledger::LedgerRepository;
use crate::loans::LoanRepository;
use crate::operations::OperationRepository;
use crate::settings::SettingsRepository;

/// Every repository of the SQLite backend, sharing one pool and one writer.
#[derive(Clone)]
pub struct SqliteStore {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub accounts: Arc<AccountRepository>,
    pub goals: Arc<GoalRepository>,
    pub loans: Arc<LoanRepository>,
    pub operations: Arc<OperationRepository>,
    pub settings: Arc<SettingsRepository>,
    pub ledger: Arc<LedgerRepository>,
}

impl SqliteStore {
    /// Initializes the database under `app_data_dir`, runs pending
    /// migrations and starts the writer actor. Needs a Tokio runtime.
    pub fn open(app_data_dir: &str) -> Result<Self> {
        let db_path = db::init(app_data_dir)?;
        info!("Database path in use: {}", db_path);
        Self::open_path(&db_path)
    }

    /// Like [`SqliteStore::open`], for an explicit database file.
    pub fn open_path(db_path: &str) -> Result<Self> {
        let pool = db::create_pool(db_path)?;
        db::run_migrations(&pool)?;
        let writer = db::spawn_writer((*pool).clone());

        Ok(Self {
            accounts: Arc::new(AccountRepository::new(pool.clone(), writer.clone())),
            goals: Arc::new(GoalRepository::new(pool.clone(), writer.clone())),
            loans: Arc::new(LoanRepository::new(pool.clone(), writer.clone())),
            operations: Arc::new(OperationRepository::new(pool.clone(), writer.clone())),
            settings: Arc::new(SettingsRepository::new(pool.clone(), writer.clone())),
            ledger: Arc::new(LedgerRepository::new(writer.clone())),
            pool,
            writer,
        })
    }
}
