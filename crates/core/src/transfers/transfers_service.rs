use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transfers_traits::TransferServiceTrait;
use crate::accounts::{Account, AccountRepositoryTrait, NewTransaction};
use crate::errors::{Error, Result};
use crate::goals::{Deposit, Goal, GoalRepositoryTrait, GoalStatus, NewDeposit};
use crate::ledger::{
    AccountEntry, CommitReceipt, GoalBalanceChange, LedgerCommit, LedgerRepositoryTrait,
    LoanDebtChange,
};
use crate::loans::{Loan, LoanRepositoryTrait, NewPayment, Payment};
use crate::operations::{MovementStatus, NewOperation, OperationType};
use crate::utils::time_utils::{add_months, now_naive, today};

/// Service for moving money from linked accounts into goals and loans.
pub struct TransferService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    loan_repo: Arc<dyn LoanRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
    ledger_repo: Arc<dyn LedgerRepositoryTrait>,
}

impl TransferService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        loan_repo: Arc<dyn LoanRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
        ledger_repo: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            goal_repo,
            loan_repo,
            account_repo,
            ledger_repo,
        }
    }

    /// The lowest-id account of a bank pays for its goals and loans.
    fn funding_account(&self, bank_id: &str) -> Result<Account> {
        self.account_repo
            .list()?
            .into_iter()
            .filter(|account| account.bank_id == bank_id)
            .min_by_key(|account| account.id)
            .ok_or_else(|| Error::NotFound(format!("No linked account for bank '{}'", bank_id)))
    }

    async fn commit_deposit(
        &self,
        goal: &Goal,
        amount: Decimal,
        date: NaiveDate,
        next_deposit: Option<NaiveDate>,
    ) -> Result<Deposit> {
        let account = self.funding_account(&goal.bank_id)?;
        let commit = LedgerCommit {
            goal_changes: vec![GoalBalanceChange {
                goal_id: goal.id,
                expected_version: goal.version,
                delta: amount,
                next_deposit,
            }],
            account_entries: vec![AccountEntry {
                account_id: account.id,
                transaction: NewTransaction::new(
                    date,
                    format!("Deposit to goal '{}'", goal.name),
                    -amount,
                ),
            }],
            deposits: vec![NewDeposit {
                goal_id: goal.id,
                amount,
                date,
                status: MovementStatus::Completed,
            }],
            operations: vec![
                NewOperation::completed(now_naive(), OperationType::Deposit, amount)
                    .for_goal(&goal.name),
            ],
            ..Default::default()
        };

        let receipt = self.ledger_repo.commit(commit).await?;
        info!(
            "Deposited {} from account {} into goal {} '{}'",
            amount, account.id, goal.id, goal.name
        );
        first_of(receipt.deposits, "deposit")
    }

    /// Records a deposit that could not be made. The schedule still advances
    /// so the same month is not retried on every run.
    async fn record_failed_deposit(
        &self,
        goal_id: i64,
        amount: Decimal,
        date: NaiveDate,
        next_deposit: Option<NaiveDate>,
        reason: &Error,
    ) -> Option<Deposit> {
        let attempt = self
            .commit_failed_deposit(goal_id, amount, date, next_deposit, reason)
            .await;
        match attempt {
            Ok(receipt) => receipt.deposits.into_iter().next(),
            Err(e) => {
                error!(
                    "Could not record failed deposit for goal {}: {}",
                    goal_id, e
                );
                None
            }
        }
    }

    async fn commit_failed_deposit(
        &self,
        goal_id: i64,
        amount: Decimal,
        date: NaiveDate,
        next_deposit: Option<NaiveDate>,
        reason: &Error,
    ) -> Result<CommitReceipt> {
        // Re-read: the failed attempt may have been a version conflict.
        let goal = self.goal_repo.get_by_id(goal_id)?;
        let commit = LedgerCommit {
            goal_changes: next_deposit
                .map(|next| GoalBalanceChange {
                    goal_id,
                    expected_version: goal.version,
                    delta: Decimal::ZERO,
                    next_deposit: Some(next),
                })
                .into_iter()
                .collect(),
            deposits: vec![NewDeposit {
                goal_id,
                amount,
                date,
                status: MovementStatus::Failed,
            }],
            operations: vec![NewOperation::failed(
                now_naive(),
                OperationType::Deposit,
                amount,
                reason.to_string(),
            )
            .for_goal(&goal.name)],
            ..Default::default()
        };
        self.ledger_repo.commit(commit).await
    }

    async fn commit_payment(
        &self,
        loan: &Loan,
        amount: Decimal,
        date: NaiveDate,
        next_payment: Option<NaiveDate>,
    ) -> Result<Payment> {
        let account = self.funding_account(&loan.bank_id)?;
        let commit = LedgerCommit {
            loan_changes: vec![LoanDebtChange {
                loan_id: loan.id,
                delta: -amount,
                next_payment,
            }],
            account_entries: vec![AccountEntry {
                account_id: account.id,
                transaction: NewTransaction::new(
                    date,
                    format!("Payment for loan '{}'", loan.name),
                    -amount,
                ),
            }],
            payments: vec![NewPayment {
                loan_id: loan.id,
                amount,
                date,
                status: MovementStatus::Completed,
            }],
            operations: vec![
                NewOperation::completed(now_naive(), OperationType::LoanPayment, amount)
                    .for_loan(&loan.name),
            ],
            ..Default::default()
        };

        let receipt = self.ledger_repo.commit(commit).await?;
        info!(
            "Paid {} from account {} toward loan {} '{}'",
            amount, account.id, loan.id, loan.name
        );
        first_of(receipt.payments, "payment")
    }

    async fn record_failed_payment(
        &self,
        loan: &Loan,
        amount: Decimal,
        date: NaiveDate,
        next_payment: Option<NaiveDate>,
        reason: &Error,
    ) -> Option<Payment> {
        let commit = LedgerCommit {
            loan_changes: next_payment
                .map(|next| LoanDebtChange {
                    loan_id: loan.id,
                    delta: Decimal::ZERO,
                    next_payment: Some(next),
                })
                .into_iter()
                .collect(),
            payments: vec![NewPayment {
                loan_id: loan.id,
                amount,
                date,
                status: MovementStatus::Failed,
            }],
            operations: vec![NewOperation::failed(
                now_naive(),
                OperationType::LoanPayment,
                amount,
                reason.to_string(),
            )
            .for_loan(&loan.name)],
            ..Default::default()
        };

        match self.ledger_repo.commit(commit).await {
            Ok(receipt) => receipt.payments.into_iter().next(),
            Err(e) => {
                error!(
                    "Could not record failed payment for loan {}: {}",
                    loan.id, e
                );
                None
            }
        }
    }
}

fn first_of<T>(rows: Vec<T>, what: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::Unexpected(format!("Ledger commit returned no {}", what)))
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_input("Amount must be positive"));
    }
    Ok(())
}

#[async_trait]
impl TransferServiceTrait for TransferService {
    async fn deposit_to_goal(&self, goal_id: i64, amount: Decimal) -> Result<Deposit> {
        ensure_positive(amount)?;
        let goal = self.goal_repo.get_by_id(goal_id)?;
        let date = today();

        match self.commit_deposit(&goal, amount, date, None).await {
            Ok(deposit) => Ok(deposit),
            Err(err) => {
                warn!("Deposit of {} into goal {} failed: {}", amount, goal_id, err);
                self.record_failed_deposit(goal_id, amount, date, None, &err)
                    .await;
                Err(err)
            }
        }
    }

    async fn run_scheduled_deposits(&self, today: NaiveDate) -> Result<Vec<Deposit>> {
        let mut deposits = Vec::new();

        for goal in self.goal_repo.list()? {
            if goal.monthly_amount <= Decimal::ZERO
                || goal.next_deposit > today
                || goal.status() == GoalStatus::Completed
            {
                continue;
            }

            let amount = goal.monthly_amount.min(goal.remaining_amount());
            let next_deposit = add_months(goal.next_deposit, 1);
            debug!(
                "Goal {} is due on {}, depositing {}",
                goal.id, goal.next_deposit, amount
            );

            match self
                .commit_deposit(&goal, amount, today, Some(next_deposit))
                .await
            {
                Ok(deposit) => deposits.push(deposit),
                Err(err) => {
                    warn!(
                        "Scheduled deposit of {} into goal {} failed: {}",
                        amount, goal.id, err
                    );
                    deposits.extend(
                        self.record_failed_deposit(
                            goal.id,
                            amount,
                            today,
                            Some(next_deposit),
                            &err,
                        )
                        .await,
                    );
                }
            }
        }
        Ok(deposits)
    }

    async fn pay_loan(&self, loan_id: i64, amount: Decimal) -> Result<Payment> {
        ensure_positive(amount)?;
        let loan = self.loan_repo.get_by_id(loan_id)?;
        if loan.is_paid_off() {
            return Err(Error::invalid_input(format!(
                "Loan '{}' is already paid off",
                loan.name
            )));
        }

        let amount = amount.min(loan.debt);
        let date = today();
        match self.commit_payment(&loan, amount, date, None).await {
            Ok(payment) => Ok(payment),
            Err(err) => {
                warn!("Payment of {} toward loan {} failed: {}", amount, loan_id, err);
                self.record_failed_payment(&loan, amount, date, None, &err)
                    .await;
                Err(err)
            }
        }
    }

    async fn run_loan_autopayments(&self, today: NaiveDate) -> Result<Vec<Payment>> {
        let mut payments = Vec::new();

        for loan in self.loan_repo.list()? {
            if !loan.auto_payment
                || loan.is_paid_off()
                || loan.monthly_payment <= Decimal::ZERO
                || loan.next_payment > today
            {
                continue;
            }

            let amount = loan.monthly_payment.min(loan.debt);
            let next_payment = add_months(loan.next_payment, 1);
            match self
                .commit_payment(&loan, amount, today, Some(next_payment))
                .await
            {
                Ok(payment) => payments.push(payment),
                Err(err) => {
                    warn!(
                        "Auto-payment of {} toward loan {} failed: {}",
                        amount, loan.id, err
                    );
                    payments.extend(
                        self.record_failed_payment(&loan, amount, today, Some(next_payment), &err)
                            .await,
                    );
                }
            }
        }
        Ok(payments)
    }
}
