use async_trait::async_trait;

use super::ledger_model::{CommitReceipt, LedgerCommit};
use crate::errors::Result;

/// Atomic write path for every fund movement.
///
/// Implementations apply the whole commit in one store transaction. On any
/// error nothing is written, including the operations in the commit.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt>;
}
