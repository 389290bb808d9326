//! Staged ledger changes and the result of applying them.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::accounts::{Account, NewTransaction, Transaction};
use crate::goals::{Deposit, Goal, NewDeposit};
use crate::loans::{Loan, NewPayment, Payment};
use crate::operations::{NewOperation, Operation};

/// Change to a goal's balance, guarded by the version the caller last read.
///
/// The store rejects the whole commit with `Conflict` if the goal's version
/// moved since. The resulting balance is floored at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalBalanceChange {
    pub goal_id: i64,
    pub expected_version: i64,
    pub delta: Decimal,
    pub next_deposit: Option<NaiveDate>,
}

/// Change to a loan's outstanding debt. The resulting debt is floored at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanDebtChange {
    pub loan_id: i64,
    pub delta: Decimal,
    pub next_payment: Option<NaiveDate>,
}

/// Transaction to append to an account, moving its balance by the amount.
///
/// A debit that would take the balance below zero fails the commit with
/// `InsufficientFunds`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountEntry {
    pub account_id: i64,
    pub transaction: NewTransaction,
}

/// Everything one fund movement writes. Applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerCommit {
    pub goal_changes: Vec<GoalBalanceChange>,
    pub loan_changes: Vec<LoanDebtChange>,
    pub account_entries: Vec<AccountEntry>,
    pub deposits: Vec<NewDeposit>,
    pub payments: Vec<NewPayment>,
    pub operations: Vec<NewOperation>,
}

impl LedgerCommit {
    pub fn is_empty(&self) -> bool {
        self.goal_changes.is_empty()
            && self.loan_changes.is_empty()
            && self.account_entries.is_empty()
            && self.deposits.is_empty()
            && self.payments.is_empty()
            && self.operations.is_empty()
    }
}

/// Rows as they look after a successful commit, in the order they were staged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReceipt {
    pub goals: Vec<Goal>,
    pub loans: Vec<Loan>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub deposits: Vec<Deposit>,
    pub payments: Vec<Payment>,
    pub operations: Vec<Operation>,
}
