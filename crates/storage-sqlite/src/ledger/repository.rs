use async_trait::async_trait;
use log::debug;

use autosave_core::errors::Result;
use autosave_core::ledger::{CommitReceipt, LedgerCommit, LedgerRepositoryTrait};
use autosave_core::utils::time_utils::now_naive;

use crate::accounts::append_transaction_in;
use crate::db::WriteHandle;
use crate::goals::{apply_balance_change_in, insert_deposit_in};
use crate::loans::{apply_debt_change_in, insert_payment_in, load_loan};
use crate::operations::insert_operation_in;

/// Applies ledger commits as one write-actor job, so the whole commit runs in
/// a single immediate transaction and commits never interleave.
pub struct LedgerRepository {
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt> {
        self.writer
            .exec(move |conn| {
                let now = now_naive();
                let mut receipt = CommitReceipt::default();

                for change in commit.goal_changes {
                    receipt.goals.push(apply_balance_change_in(conn, change, now)?);
                }

                let mut touched_loans = Vec::with_capacity(commit.loan_changes.len());
                for change in commit.loan_changes {
                    touched_loans.push(change.loan_id);
                    apply_debt_change_in(conn, change, now)?;
                }

                for entry in commit.account_entries {
                    let (account, transaction) =
                        append_transaction_in(conn, entry.account_id, entry.transaction, true)?;
                    receipt.accounts.push(account);
                    receipt.transactions.push(transaction);
                }

                for new_deposit in commit.deposits {
                    receipt.deposits.push(insert_deposit_in(conn, new_deposit)?);
                }

                for new_payment in commit.payments {
                    receipt.payments.push(insert_payment_in(conn, new_payment)?);
                }

                for new_operation in commit.operations {
                    receipt
                        .operations
                        .push(insert_operation_in(conn, new_operation)?);
                }

                for loan_id in touched_loans {
                    receipt.loans.push(load_loan(conn, loan_id)?);
                }

                debug!(
                    "Committed ledger changes: {} goals, {} loans, {} transactions, {} operations",
                    receipt.goals.len(),
                    receipt.loans.len(),
                    receipt.transactions.len(),
                    receipt.operations.len()
                );
                Ok(receipt)
            })
            .await
    }
}
