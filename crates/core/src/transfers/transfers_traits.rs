use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::goals::Deposit;
use crate::loans::Payment;

/// Moves money between accounts and goals or loans.
///
/// Every movement is one ledger commit. A movement that cannot be made is
/// still recorded as a `failed` deposit or payment with a `failed` operation.
#[async_trait]
pub trait TransferServiceTrait: Send + Sync {
    /// Moves `amount` from the goal's funding account into the goal.
    async fn deposit_to_goal(&self, goal_id: i64, amount: Decimal) -> Result<Deposit>;

    /// Makes the monthly deposit of every goal that is due on `today`, in
    /// priority order. Returns completed and failed deposits alike.
    async fn run_scheduled_deposits(&self, today: NaiveDate) -> Result<Vec<Deposit>>;

    /// Pays `amount` toward a loan, capped at the remaining debt.
    async fn pay_loan(&self, loan_id: i64, amount: Decimal) -> Result<Payment>;

    /// Makes the monthly payment of every auto-paid loan that is due.
    async fn run_loan_autopayments(&self, today: NaiveDate) -> Result<Vec<Payment>>;
}
