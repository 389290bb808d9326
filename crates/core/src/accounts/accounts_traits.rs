//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::accounts_model::{Account, NewAccount, NewTransaction, Transaction};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
///
/// Implementations must keep `balance` and the transaction log in lockstep:
/// every write that appends a transaction applies its amount to the balance
/// in the same store transaction.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates a new account, recording a non-zero opening balance as its
    /// first transaction.
    async fn create(&self, new_account: NewAccount) -> Result<Account>;

    /// Deletes an account and its transactions.
    ///
    /// Returns the number of deleted accounts.
    async fn delete(&self, account_id: i64) -> Result<usize>;

    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: i64) -> Result<Account>;

    /// Lists all accounts ordered by id.
    fn list(&self) -> Result<Vec<Account>>;

    /// Lists an account's transactions, newest first.
    fn list_transactions(&self, account_id: i64) -> Result<Vec<Transaction>>;

    /// Appends a transaction and applies its amount to the balance.
    async fn append_transaction(
        &self,
        account_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Creates a new account with business validation.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Deletes an account unless something still depends on it.
    async fn delete_account(&self, account_id: i64) -> Result<()>;

    /// Retrieves an account by ID.
    fn get_account(&self, account_id: i64) -> Result<Account>;

    /// Lists every account.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Lists an account's transactions, newest first.
    fn get_account_transactions(&self, account_id: i64) -> Result<Vec<Transaction>>;

    /// Records a transaction imported from the bank connection.
    async fn record_transaction(
        &self,
        account_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction>;
}
