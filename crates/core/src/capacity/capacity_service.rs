use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::capacity_model::{estimate_savings_capacity, FinancialProfile};
use super::capacity_traits::CapacityServiceTrait;
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result};
use crate::utils::time_utils::sub_months;

pub struct CapacityService {
    account_repo: Arc<dyn AccountRepositoryTrait>,
}

impl CapacityService {
    pub fn new(account_repo: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { account_repo }
    }
}

impl CapacityServiceTrait for CapacityService {
    fn estimate_savings_capacity(
        &self,
        avg_salary: Decimal,
        avg_expenses: Decimal,
    ) -> Result<Decimal> {
        if avg_salary < Decimal::ZERO || avg_expenses < Decimal::ZERO {
            return Err(Error::invalid_input(
                "Average salary and expenses cannot be negative",
            ));
        }
        Ok(estimate_savings_capacity(avg_salary, avg_expenses))
    }

    fn financial_profile(
        &self,
        salary_transaction_ids: &[i64],
        period_months: u32,
        today: NaiveDate,
    ) -> Result<FinancialProfile> {
        let from = sub_months(today, period_months);
        let mut history = Vec::new();
        for account in self.account_repo.list()? {
            history.extend(
                self.account_repo
                    .list_transactions(account.id)?
                    .into_iter()
                    .filter(|tx| tx.date > from && tx.date <= today),
            );
        }
        debug!(
            "Building financial profile from {} transactions between {} and {}",
            history.len(),
            from,
            today
        );

        let salary_ids: HashSet<i64> = salary_transaction_ids.iter().copied().collect();
        FinancialProfile::from_transactions(&history, &salary_ids, period_months)
    }
}
