//! Ledger module - the atomic commit shared by every fund movement.

mod ledger_model;
mod ledger_traits;

pub use ledger_model::{
    AccountEntry, CommitReceipt, GoalBalanceChange, LedgerCommit, LoanDebtChange,
};
pub use ledger_traits::LedgerRepositoryTrait;
