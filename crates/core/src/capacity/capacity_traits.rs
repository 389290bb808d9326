//! Capacity service traits.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::capacity_model::FinancialProfile;
use crate::errors::Result;

/// Trait for savings capacity queries.
pub trait CapacityServiceTrait: Send + Sync {
    fn estimate_savings_capacity(&self, avg_salary: Decimal, avg_expenses: Decimal)
        -> Result<Decimal>;

    /// Profile over the `period_months` calendar months ending on `today`,
    /// across every linked account.
    fn financial_profile(
        &self,
        salary_transaction_ids: &[i64],
        period_months: u32,
        today: NaiveDate,
    ) -> Result<FinancialProfile>;
}
