use async_trait::async_trait;

use super::{lock, write, SharedState};
use crate::accounts::{Account, AccountRepositoryTrait, NewAccount, NewTransaction, Transaction};
use crate::errors::{Error, Result};
use crate::goals::{Deposit, Goal, GoalRepositoryTrait, GoalUpdate, NewGoal};
use crate::ledger::{CommitReceipt, LedgerCommit, LedgerRepositoryTrait};
use crate::loans::{Loan, LoanRepositoryTrait, LoanUpdate, NewLoan, Payment};
use crate::operations::{NewOperation, Operation, OperationRepositoryTrait};
use crate::settings::{is_known_key, Settings, SettingsRepositoryTrait, SettingsUpdate};
use crate::utils::time_utils::now_naive;

macro_rules! memory_repository {
    ($name:ident) => {
        pub struct $name {
            state: SharedState,
        }

        impl $name {
            pub(super) fn new(state: SharedState) -> Self {
                Self { state }
            }
        }
    };
}

memory_repository!(InMemoryAccountRepository);
memory_repository!(InMemoryGoalRepository);
memory_repository!(InMemoryLoanRepository);
memory_repository!(InMemoryOperationRepository);
memory_repository!(InMemorySettingsRepository);
memory_repository!(InMemoryLedgerRepository);

#[async_trait]
impl AccountRepositoryTrait for InMemoryAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        write(&self.state, |state| {
            state.create_account(new_account, now_naive())
        })
    }

    async fn delete(&self, account_id: i64) -> Result<usize> {
        write(&self.state, |state| Ok(state.delete_account(account_id)))
    }

    fn get_by_id(&self, account_id: i64) -> Result<Account> {
        Ok(lock(&self.state)?.account(account_id)?.clone())
    }

    fn list(&self) -> Result<Vec<Account>> {
        Ok(lock(&self.state)?.accounts.values().cloned().collect())
    }

    fn list_transactions(&self, account_id: i64) -> Result<Vec<Transaction>> {
        Ok(lock(&self.state)?.transactions_of(account_id))
    }

    async fn append_transaction(
        &self,
        account_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        write(&self.state, |state| {
            state.append_transaction(account_id, new_transaction, false)
        })
    }
}

#[async_trait]
impl GoalRepositoryTrait for InMemoryGoalRepository {
    fn list(&self) -> Result<Vec<Goal>> {
        Ok(lock(&self.state)?.goals_by_order())
    }

    fn get_by_id(&self, goal_id: i64) -> Result<Goal> {
        Ok(lock(&self.state)?.goal(goal_id)?.clone())
    }

    async fn insert(&self, new_goal: NewGoal) -> Result<Goal> {
        write(&self.state, |state| Ok(state.insert_goal(new_goal, now_naive())))
    }

    async fn update(&self, goal_id: i64, update: GoalUpdate) -> Result<Goal> {
        write(&self.state, |state| {
            state.update_goal(goal_id, &update, now_naive())
        })
    }

    async fn delete(&self, goal_id: i64) -> Result<usize> {
        write(&self.state, |state| Ok(state.delete_goal(goal_id, now_naive())))
    }

    async fn apply_ordering(&self, ordered_ids: Vec<i64>) -> Result<Vec<Goal>> {
        write(&self.state, |state| {
            state.apply_ordering(&ordered_ids, now_naive())?;
            Ok(state.goals_by_order())
        })
    }

    fn list_deposits(&self, goal_id: i64) -> Result<Vec<Deposit>> {
        Ok(lock(&self.state)?.deposits_of(goal_id))
    }
}

#[async_trait]
impl LoanRepositoryTrait for InMemoryLoanRepository {
    fn list(&self) -> Result<Vec<Loan>> {
        Ok(lock(&self.state)?.all_loans())
    }

    fn get_by_id(&self, loan_id: i64) -> Result<Loan> {
        lock(&self.state)?.loan(loan_id)
    }

    async fn insert(&self, new_loan: NewLoan) -> Result<Loan> {
        write(&self.state, |state| Ok(state.insert_loan(new_loan, now_naive())))
    }

    async fn update(&self, loan_id: i64, update: LoanUpdate) -> Result<Loan> {
        write(&self.state, |state| {
            state.update_loan(loan_id, &update, now_naive())
        })
    }

    async fn delete(&self, loan_id: i64) -> Result<usize> {
        write(&self.state, |state| Ok(state.delete_loan(loan_id)))
    }

    fn list_payments(&self, loan_id: i64) -> Result<Vec<Payment>> {
        Ok(lock(&self.state)?.payments_of(loan_id))
    }
}

#[async_trait]
impl OperationRepositoryTrait for InMemoryOperationRepository {
    fn list(&self) -> Result<Vec<Operation>> {
        Ok(lock(&self.state)?.operations_for_display())
    }

    async fn append(&self, new_operation: NewOperation) -> Result<Operation> {
        write(&self.state, |state| Ok(state.push_operation(new_operation)))
    }
}

#[async_trait]
impl SettingsRepositoryTrait for InMemorySettingsRepository {
    fn get_settings(&self) -> Result<Settings> {
        lock(&self.state)?.typed_settings()
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        write(&self.state, |state| {
            state.update_settings(new_settings);
            Ok(())
        })
    }

    fn get_setting(&self, setting_key: &str) -> Result<String> {
        lock(&self.state)?
            .settings
            .get(setting_key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Setting '{}' not found", setting_key)))
    }

    async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()> {
        if !is_known_key(setting_key) {
            return Err(Error::InvalidConfigValue(format!(
                "Unknown setting '{}'",
                setting_key
            )));
        }
        write(&self.state, |state| {
            state
                .settings
                .insert(setting_key.to_string(), setting_value.to_string());
            Ok(())
        })
    }
}

#[async_trait]
impl LedgerRepositoryTrait for InMemoryLedgerRepository {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt> {
        write(&self.state, |state| state.apply_commit(commit, now_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::NewTransaction;
    use crate::ledger::{AccountEntry, GoalBalanceChange};
    use crate::memory::InMemoryStore;
    use crate::operations::OperationType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    async fn seeded() -> (InMemoryStore, Account, Goal) {
        let store = InMemoryStore::new();
        let account = store
            .accounts()
            .create(NewAccount {
                bank_id: "vbank".to_string(),
                number: "1".to_string(),
                opening_balance: dec!(1000),
            })
            .await
            .unwrap();
        let goal = store
            .goals()
            .insert(NewGoal {
                name: "Car".to_string(),
                target_amount: dec!(5000),
                monthly_amount: dec!(500),
                next_deposit: date(),
                bank_id: "vbank".to_string(),
            })
            .await
            .unwrap();
        (store, account, goal)
    }

    fn transfer(account: &Account, goal: &Goal, amount: Decimal) -> LedgerCommit {
        LedgerCommit {
            goal_changes: vec![GoalBalanceChange {
                goal_id: goal.id,
                expected_version: goal.version,
                delta: amount,
                next_deposit: None,
            }],
            account_entries: vec![AccountEntry {
                account_id: account.id,
                transaction: NewTransaction::new(date(), "Deposit to Car", -amount),
            }],
            operations: vec![NewOperation::completed(
                now_naive(),
                OperationType::Deposit,
                amount,
            )
            .for_goal("Car")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn commit_applies_every_change() {
        let (store, account, goal) = seeded().await;

        let receipt = store
            .ledger()
            .commit(transfer(&account, &goal, dec!(400)))
            .await
            .unwrap();

        assert_eq!(receipt.goals[0].current_amount, dec!(400));
        assert_eq!(receipt.goals[0].version, goal.version + 1);
        assert_eq!(receipt.accounts[0].balance, dec!(600));
        assert_eq!(receipt.operations.len(), 1);
        assert_eq!(store.operations().list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overdraft_rolls_back_the_whole_commit() {
        let (store, account, goal) = seeded().await;
        let before = store.snapshot();

        let err = store
            .ledger()
            .commit(transfer(&account, &goal, dec!(1500)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn stale_goal_version_is_a_conflict() {
        let (store, account, goal) = seeded().await;
        store
            .goals()
            .update(
                goal.id,
                GoalUpdate {
                    name: Some("Car".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let before = store.snapshot();

        let err = store
            .ledger()
            .commit(transfer(&account, &goal, dec!(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn opening_balance_matches_transaction_sum() {
        let (store, account, _) = seeded().await;
        let sum: Decimal = store
            .accounts()
            .list_transactions(account.id)
            .unwrap()
            .iter()
            .map(|tx| tx.amount)
            .sum();
        assert_eq!(sum, account.balance);
    }

    #[tokio::test]
    async fn unknown_setting_key_is_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .settings()
            .update_setting("theme", "dark")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }
}
