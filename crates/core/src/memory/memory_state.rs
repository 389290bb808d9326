use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::accounts::{Account, NewAccount, NewTransaction, Transaction};
use crate::constants::OPENING_BALANCE_DESCRIPTION;
use crate::errors::{Error, Result};
use crate::goals::goals_ordering::{assign_orders, compacted_orders, validate_permutation};
use crate::goals::{Deposit, Goal, GoalUpdate, NewDeposit, NewGoal};
use crate::ledger::{CommitReceipt, LedgerCommit};
use crate::loans::{Loan, LoanUpdate, NewLoan, Payment};
use crate::operations::{sort_for_display, NewOperation, Operation};
use crate::settings::{Settings, SettingsUpdate};

#[derive(Debug, Clone, Default, PartialEq)]
struct Sequences {
    account: i64,
    transaction: i64,
    goal: i64,
    deposit: i64,
    loan: i64,
    payment: i64,
    operation: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Complete contents of the in-memory backend.
///
/// Loans are kept without their payment history; it is attached on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryState {
    pub accounts: BTreeMap<i64, Account>,
    pub transactions: Vec<Transaction>,
    pub goals: BTreeMap<i64, Goal>,
    pub deposits: Vec<Deposit>,
    pub loans: BTreeMap<i64, Loan>,
    pub payments: Vec<Payment>,
    pub operations: Vec<Operation>,
    pub settings: BTreeMap<String, String>,
    sequences: Sequences,
}

impl MemoryState {
    // --- accounts ---

    pub(super) fn account(&self, account_id: i64) -> Result<&Account> {
        self.accounts
            .get(&account_id)
            .ok_or_else(|| Error::not_found("Account", account_id))
    }

    pub(super) fn create_account(
        &mut self,
        new_account: NewAccount,
        now: NaiveDateTime,
    ) -> Result<Account> {
        let id = next_id(&mut self.sequences.account);
        self.accounts.insert(
            id,
            Account {
                id,
                bank_id: new_account.bank_id,
                number: new_account.number,
                balance: Decimal::ZERO,
                created_at: now,
            },
        );

        if !new_account.opening_balance.is_zero() {
            let opening = NewTransaction::new(
                now.date(),
                OPENING_BALANCE_DESCRIPTION,
                new_account.opening_balance,
            );
            self.append_transaction(id, opening, false)?;
        }
        Ok(self.account(id)?.clone())
    }

    /// Appends a transaction and moves the balance. With `guard_overdraft`,
    /// a debit larger than the balance is refused.
    pub(super) fn append_transaction(
        &mut self,
        account_id: i64,
        new_transaction: NewTransaction,
        guard_overdraft: bool,
    ) -> Result<Transaction> {
        new_transaction.validate()?;
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| Error::not_found("Account", account_id))?;

        let amount = new_transaction.amount;
        if guard_overdraft && amount < Decimal::ZERO && account.balance + amount < Decimal::ZERO {
            return Err(Error::InsufficientFunds {
                requested: -amount,
                available: account.balance,
            });
        }
        account.balance += amount;

        let transaction =
            new_transaction.into_transaction(next_id(&mut self.sequences.transaction), account_id);
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    pub(super) fn delete_account(&mut self, account_id: i64) -> usize {
        if self.accounts.remove(&account_id).is_none() {
            return 0;
        }
        self.transactions.retain(|tx| tx.account_id != account_id);
        1
    }

    pub(super) fn transactions_of(&self, account_id: i64) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.id.cmp(&a.id));
        transactions
    }

    // --- goals ---

    pub(super) fn goal(&self, goal_id: i64) -> Result<&Goal> {
        self.goals
            .get(&goal_id)
            .ok_or_else(|| Error::not_found("Goal", goal_id))
    }

    pub(super) fn goals_by_order(&self) -> Vec<Goal> {
        let mut goals: Vec<Goal> = self.goals.values().cloned().collect();
        goals.sort_by_key(|goal| goal.order);
        goals
    }

    pub(super) fn insert_goal(&mut self, new_goal: NewGoal, now: NaiveDateTime) -> Goal {
        let id = next_id(&mut self.sequences.goal);
        let goal = Goal {
            id,
            name: new_goal.name,
            target_amount: new_goal.target_amount,
            current_amount: Decimal::ZERO,
            monthly_amount: new_goal.monthly_amount,
            next_deposit: new_goal.next_deposit,
            bank_id: new_goal.bank_id,
            order: self.goals.len() as i32 + 1,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.goals.insert(id, goal.clone());
        goal
    }

    pub(super) fn update_goal(
        &mut self,
        goal_id: i64,
        update: &GoalUpdate,
        now: NaiveDateTime,
    ) -> Result<Goal> {
        let goal = self
            .goals
            .get_mut(&goal_id)
            .ok_or_else(|| Error::not_found("Goal", goal_id))?;
        update.apply_to(goal);
        goal.version += 1;
        goal.updated_at = now;
        Ok(goal.clone())
    }

    pub(super) fn delete_goal(&mut self, goal_id: i64, now: NaiveDateTime) -> usize {
        let Some(removed) = self.goals.remove(&goal_id) else {
            return 0;
        };
        self.deposits.retain(|deposit| deposit.goal_id != goal_id);

        let remaining: Vec<(i64, i32)> = self
            .goals
            .values()
            .map(|goal| (goal.id, goal.order))
            .collect();
        for (id, order) in compacted_orders(&remaining, removed.order) {
            self.set_order(id, order, now);
        }
        1
    }

    pub(super) fn apply_ordering(&mut self, ordered_ids: &[i64], now: NaiveDateTime) -> Result<()> {
        let existing: Vec<i64> = self.goals.keys().copied().collect();
        validate_permutation(&existing, ordered_ids)?;
        for (id, order) in assign_orders(ordered_ids) {
            self.set_order(id, order, now);
        }
        Ok(())
    }

    // Order-only writes leave the version alone.
    fn set_order(&mut self, goal_id: i64, order: i32, now: NaiveDateTime) {
        if let Some(goal) = self.goals.get_mut(&goal_id) {
            if goal.order != order {
                goal.order = order;
                goal.updated_at = now;
            }
        }
    }

    pub(super) fn deposits_of(&self, goal_id: i64) -> Vec<Deposit> {
        let mut deposits: Vec<Deposit> = self
            .deposits
            .iter()
            .filter(|deposit| deposit.goal_id == goal_id)
            .cloned()
            .collect();
        deposits.sort_by(|a, b| b.id.cmp(&a.id));
        deposits
    }

    fn push_deposit(&mut self, new_deposit: NewDeposit) -> Result<Deposit> {
        self.goal(new_deposit.goal_id)?;
        let deposit = new_deposit.into_deposit(next_id(&mut self.sequences.deposit));
        self.deposits.push(deposit.clone());
        Ok(deposit)
    }

    // --- loans ---

    pub(super) fn loan(&self, loan_id: i64) -> Result<Loan> {
        let mut loan = self
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Loan", loan_id))?;
        loan.payment_history = self.payments_of(loan_id);
        Ok(loan)
    }

    pub(super) fn all_loans(&self) -> Vec<Loan> {
        self.loans
            .keys()
            .filter_map(|id| self.loan(*id).ok())
            .collect()
    }

    pub(super) fn insert_loan(&mut self, new_loan: NewLoan, now: NaiveDateTime) -> Loan {
        let id = next_id(&mut self.sequences.loan);
        let loan = Loan {
            id,
            name: new_loan.name,
            debt: new_loan.debt,
            rate: new_loan.rate,
            monthly_payment: new_loan.monthly_payment,
            next_payment: new_loan.next_payment,
            bank_id: new_loan.bank_id,
            auto_payment: new_loan.auto_payment,
            payment_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.loans.insert(id, loan.clone());
        loan
    }

    pub(super) fn update_loan(
        &mut self,
        loan_id: i64,
        update: &LoanUpdate,
        now: NaiveDateTime,
    ) -> Result<Loan> {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or_else(|| Error::not_found("Loan", loan_id))?;
        update.apply_to(loan);
        loan.updated_at = now;
        self.loan(loan_id)
    }

    pub(super) fn delete_loan(&mut self, loan_id: i64) -> usize {
        if self.loans.remove(&loan_id).is_none() {
            return 0;
        }
        self.payments.retain(|payment| payment.loan_id != loan_id);
        1
    }

    pub(super) fn payments_of(&self, loan_id: i64) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|payment| payment.loan_id == loan_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.id.cmp(&a.id));
        payments
    }

    // --- operations ---

    pub(super) fn operations_for_display(&self) -> Vec<Operation> {
        let mut operations = self.operations.clone();
        sort_for_display(&mut operations);
        operations
    }

    pub(super) fn push_operation(&mut self, new_operation: NewOperation) -> Operation {
        let operation = new_operation.into_operation(next_id(&mut self.sequences.operation));
        self.operations.push(operation.clone());
        operation
    }

    // --- settings ---

    pub(super) fn typed_settings(&self) -> Result<Settings> {
        Settings::from_pairs(self.settings.iter())
    }

    pub(super) fn update_settings(&mut self, update: &SettingsUpdate) {
        for (key, value) in update.into_pairs() {
            self.settings.insert(key.to_string(), value);
        }
    }

    // --- ledger ---

    pub(super) fn apply_commit(
        &mut self,
        commit: LedgerCommit,
        now: NaiveDateTime,
    ) -> Result<CommitReceipt> {
        let mut receipt = CommitReceipt::default();

        for change in commit.goal_changes {
            let goal = self
                .goals
                .get_mut(&change.goal_id)
                .ok_or_else(|| Error::not_found("Goal", change.goal_id))?;
            if goal.version != change.expected_version {
                return Err(Error::Conflict(format!(
                    "Goal '{}' changed since it was read (version {} != {})",
                    goal.name, goal.version, change.expected_version
                )));
            }
            goal.current_amount = (goal.current_amount + change.delta).max(Decimal::ZERO);
            if let Some(next_deposit) = change.next_deposit {
                goal.next_deposit = next_deposit;
            }
            goal.version += 1;
            goal.updated_at = now;
            receipt.goals.push(goal.clone());
        }

        let mut touched_loans = Vec::new();
        for change in commit.loan_changes {
            let loan = self
                .loans
                .get_mut(&change.loan_id)
                .ok_or_else(|| Error::not_found("Loan", change.loan_id))?;
            loan.debt = (loan.debt + change.delta).max(Decimal::ZERO);
            if let Some(next_payment) = change.next_payment {
                loan.next_payment = next_payment;
            }
            loan.updated_at = now;
            touched_loans.push(change.loan_id);
        }

        for entry in commit.account_entries {
            let transaction = self.append_transaction(entry.account_id, entry.transaction, true)?;
            receipt.accounts.push(self.account(entry.account_id)?.clone());
            receipt.transactions.push(transaction);
        }

        for new_deposit in commit.deposits {
            receipt.deposits.push(self.push_deposit(new_deposit)?);
        }

        for new_payment in commit.payments {
            self.loan(new_payment.loan_id)?;
            let payment = new_payment.into_payment(next_id(&mut self.sequences.payment));
            self.payments.push(payment.clone());
            receipt.payments.push(payment);
        }

        for new_operation in commit.operations {
            receipt.operations.push(self.push_operation(new_operation));
        }

        for loan_id in touched_loans {
            receipt.loans.push(self.loan(loan_id)?);
        }
        Ok(receipt)
    }
}
