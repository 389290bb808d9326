use async_trait::async_trait;
use rust_decimal::Decimal;

use super::withdrawals_model::{EmergencyWithdrawPlan, WithdrawalOutcome};
use crate::errors::Result;

/// Two-phase emergency withdrawal: plan, review, confirm.
#[async_trait]
pub trait EmergencyWithdrawalServiceTrait: Send + Sync {
    /// Computes the consequences of withdrawing `amount`. Writes nothing to
    /// the stores.
    fn plan(&self, amount: Decimal) -> Result<EmergencyWithdrawPlan>;

    /// Applies a previously issued plan as one atomic ledger commit.
    ///
    /// A plan can be confirmed at most once; a second attempt fails with
    /// `Conflict` whether or not the first one succeeded.
    async fn confirm(&self, plan: &EmergencyWithdrawPlan) -> Result<WithdrawalOutcome>;
}
