//! In-memory backend.
//!
//! Every repository handle shares one [`MemoryState`] behind a mutex. Writes
//! run against a clone of the state and replace it only when they succeed, so
//! a failed write leaves nothing behind. Used by the service tests and by
//! embedders that do not need persistence.

mod memory_repositories;
mod memory_state;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{Error, Result};

pub use memory_repositories::{
    InMemoryAccountRepository, InMemoryGoalRepository, InMemoryLedgerRepository,
    InMemoryLoanRepository, InMemoryOperationRepository, InMemorySettingsRepository,
};
pub use memory_state::MemoryState;

type SharedState = Arc<Mutex<MemoryState>>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, MemoryState>> {
    state
        .lock()
        .map_err(|_| Error::Unexpected("In-memory store lock poisoned".to_string()))
}

/// Applies `write` to a copy of the state and keeps the copy only on success.
fn write<T, F>(state: &SharedState, write: F) -> Result<T>
where
    F: FnOnce(&mut MemoryState) -> Result<T>,
{
    let mut guard = lock(state)?;
    let mut staged = guard.clone();
    let result = write(&mut staged)?;
    *guard = staged;
    Ok(result)
}

/// Entry point of the in-memory backend. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: SharedState,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the whole state, for comparing before and after an operation.
    pub fn snapshot(&self) -> MemoryState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn accounts(&self) -> Arc<InMemoryAccountRepository> {
        Arc::new(InMemoryAccountRepository::new(self.state.clone()))
    }

    pub fn goals(&self) -> Arc<InMemoryGoalRepository> {
        Arc::new(InMemoryGoalRepository::new(self.state.clone()))
    }

    pub fn loans(&self) -> Arc<InMemoryLoanRepository> {
        Arc::new(InMemoryLoanRepository::new(self.state.clone()))
    }

    pub fn operations(&self) -> Arc<InMemoryOperationRepository> {
        Arc::new(InMemoryOperationRepository::new(self.state.clone()))
    }

    pub fn settings(&self) -> Arc<InMemorySettingsRepository> {
        Arc::new(InMemorySettingsRepository::new(self.state.clone()))
    }

    pub fn ledger(&self) -> Arc<InMemoryLedgerRepository> {
        Arc::new(InMemoryLedgerRepository::new(self.state.clone()))
    }
}
