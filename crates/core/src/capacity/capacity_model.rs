//! Savings capacity models.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::accounts::Transaction;
use crate::errors::{Error, Result};
use crate::utils::round_money;

/// Money left over each month after expenses, never negative.
pub fn estimate_savings_capacity(avg_salary: Decimal, avg_expenses: Decimal) -> Decimal {
    (avg_salary - avg_expenses).max(Decimal::ZERO)
}

/// Monthly averages derived from an account holder's transaction history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub avg_salary: Decimal,
    pub avg_expenses: Decimal,
    pub savings_capacity: Decimal,
    /// Days of month on which confirmed salaries arrived, ascending.
    pub salary_days: Vec<u32>,
    pub period_months: u32,
}

impl FinancialProfile {
    /// Averages income and expenses over `period_months`.
    ///
    /// `salary_ids` are the transactions the account holder confirmed as
    /// salary; they only decide `salary_days`.
    pub fn from_transactions<'a, I>(
        transactions: I,
        salary_ids: &HashSet<i64>,
        period_months: u32,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        if period_months == 0 {
            return Err(Error::invalid_input("Period must span at least one month"));
        }

        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        let mut salary_days = BTreeSet::new();
        for tx in transactions {
            if tx.amount > Decimal::ZERO {
                income += tx.amount;
                if salary_ids.contains(&tx.id) {
                    salary_days.insert(tx.date.day());
                }
            } else {
                expenses += tx.amount.abs();
            }
        }

        let months = Decimal::from(period_months);
        let avg_salary = round_money(income / months);
        let avg_expenses = round_money(expenses / months);
        Ok(Self {
            avg_salary,
            avg_expenses,
            savings_capacity: estimate_savings_capacity(avg_salary, avg_expenses),
            salary_days: salary_days.into_iter().collect(),
            period_months,
        })
    }
}
