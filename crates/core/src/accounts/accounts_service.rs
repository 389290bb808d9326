use log::{debug, info};
use std::sync::Arc;

use super::accounts_model::{Account, NewAccount, NewTransaction, Transaction};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::{Error, Result};
use crate::goals::GoalRepositoryTrait;
use crate::loans::LoanRepositoryTrait;
use crate::settings::SettingsRepositoryTrait;

/// Service for managing linked accounts.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    loan_repository: Arc<dyn LoanRepositoryTrait>,
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        loan_repository: Arc<dyn LoanRepositoryTrait>,
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            goal_repository,
            loan_repository,
            settings_repository,
        }
    }

    /// Returns an error if deleting `account` would orphan a goal or loan, or
    /// remove the account that receives emergency withdrawals.
    fn ensure_unreferenced(&self, account: &Account) -> Result<()> {
        let settings = self.settings_repository.get_settings()?;
        if settings.home_account_id == Some(account.id) {
            return Err(Error::Conflict(format!(
                "Account {} is the home account for emergency withdrawals",
                account.id
            )));
        }

        let has_sibling = self
            .repository
            .list()?
            .iter()
            .any(|other| other.id != account.id && other.bank_id == account.bank_id);
        if has_sibling {
            return Ok(());
        }

        if let Some(goal) = self
            .goal_repository
            .list()?
            .into_iter()
            .find(|goal| goal.bank_id == account.bank_id)
        {
            return Err(Error::Conflict(format!(
                "Goal '{}' is funded from bank '{}'",
                goal.name, account.bank_id
            )));
        }
        if let Some(loan) = self
            .loan_repository
            .list()?
            .into_iter()
            .find(|loan| loan.bank_id == account.bank_id)
        {
            return Err(Error::Conflict(format!(
                "Loan '{}' is paid from bank '{}'",
                loan.name, account.bank_id
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        debug!(
            "Creating account {} at bank {}",
            new_account.number, new_account.bank_id
        );
        self.repository.create(new_account).await
    }

    async fn delete_account(&self, account_id: i64) -> Result<()> {
        let account = self.repository.get_by_id(account_id)?;
        self.ensure_unreferenced(&account)?;
        self.repository.delete(account_id).await?;
        info!("Deleted account {}", account_id);
        Ok(())
    }

    fn get_account(&self, account_id: i64) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list()
    }

    fn get_account_transactions(&self, account_id: i64) -> Result<Vec<Transaction>> {
        // Surface NotFound for unknown accounts instead of an empty list.
        self.repository.get_by_id(account_id)?;
        self.repository.list_transactions(account_id)
    }

    async fn record_transaction(
        &self,
        account_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        new_transaction.validate()?;
        self.repository
            .append_transaction(account_id, new_transaction)
            .await
    }
}
