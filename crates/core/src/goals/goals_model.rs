//! Goals domain models.

use chrono::{NaiveDate, NaiveDateTime};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::operations::MovementStatus;
use crate::utils::time_utils::add_months;

/// Domain model representing a savings goal.
///
/// `order` is the goal's 1-based priority; across all goals the orders form
/// the contiguous range `1..=N`. `version` is bumped by the store on every
/// write and lets a withdrawal plan detect that the goal changed under it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub monthly_amount: Decimal,
    pub next_deposit: NaiveDate,
    pub bank_id: String,
    pub order: i32,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new goal.
///
/// Goals start at a zero balance and only grow through deposits.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub monthly_amount: Decimal,
    pub next_deposit: NaiveDate,
    pub bank_id: String,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_target(self.target_amount)?;
        validate_monthly(self.monthly_amount)?;
        if self.bank_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "bankId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Partial update for a goal. `None` fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub monthly_amount: Option<Decimal>,
    pub next_deposit: Option<NaiveDate>,
    pub bank_id: Option<String>,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(target) = self.target_amount {
            validate_target(target)?;
        }
        if let Some(monthly) = self.monthly_amount {
            validate_monthly(monthly)?;
        }
        if let Some(bank_id) = &self.bank_id {
            if bank_id.trim().is_empty() {
                return Err(Error::invalid_input("Bank id cannot be empty"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_amount.is_none()
            && self.monthly_amount.is_none()
            && self.next_deposit.is_none()
            && self.bank_id.is_none()
    }

    /// Applies the supplied fields to `goal`.
    pub fn apply_to(&self, goal: &mut Goal) {
        if let Some(name) = &self.name {
            goal.name = name.clone();
        }
        if let Some(target) = self.target_amount {
            goal.target_amount = target;
        }
        if let Some(monthly) = self.monthly_amount {
            goal.monthly_amount = monthly;
        }
        if let Some(next_deposit) = self.next_deposit {
            goal.next_deposit = next_deposit;
        }
        if let Some(bank_id) = &self.bank_id {
            goal.bank_id = bank_id.clone();
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Goal name cannot be empty"));
    }
    Ok(())
}

fn validate_target(target: Decimal) -> Result<()> {
    if target <= Decimal::ZERO {
        return Err(Error::invalid_input("Target amount must be positive"));
    }
    Ok(())
}

fn validate_monthly(monthly: Decimal) -> Result<()> {
    if monthly.is_sign_negative() && !monthly.is_zero() {
        return Err(Error::invalid_input("Monthly amount cannot be negative"));
    }
    Ok(())
}

/// One contribution event toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: i64,
    pub goal_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: MovementStatus,
}

/// Input model for a deposit entry. The store assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDeposit {
    pub goal_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: MovementStatus,
}

impl NewDeposit {
    pub fn into_deposit(self, id: i64) -> Deposit {
        Deposit {
            id,
            goal_id: self.goal_id,
            amount: self.amount,
            date: self.date,
            status: self.status,
        }
    }
}

/// Direction for moving a goal one slot in the priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Derived state of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Top priority goal currently receiving deposits.
    Active,
    /// Queued behind a higher priority goal.
    Waiting,
    /// Target reached.
    Completed,
}

/// Progress summary computed from a goal's balances and schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: i64,
    pub status: GoalStatus,
    pub progress_percentage: Decimal,
    pub remaining_amount: Decimal,
    pub months_remaining: Option<u32>,
    pub estimated_completion: Option<NaiveDate>,
}

impl Goal {
    pub fn status(&self) -> GoalStatus {
        if self.current_amount >= self.target_amount {
            GoalStatus::Completed
        } else if self.order == 1 {
            GoalStatus::Active
        } else {
            GoalStatus::Waiting
        }
    }

    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn progress(&self) -> GoalProgress {
        let percentage = if self.target_amount > Decimal::ZERO {
            (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED)
                .min(Decimal::ONE_HUNDRED)
                .round_dp(2)
        } else {
            Decimal::ZERO
        };

        let remaining = self.remaining_amount();
        let months_remaining = if remaining.is_zero() {
            Some(0)
        } else if self.monthly_amount > Decimal::ZERO {
            (remaining / self.monthly_amount).ceil().to_u32()
        } else {
            None
        };

        GoalProgress {
            goal_id: self.id,
            status: self.status(),
            progress_percentage: percentage,
            remaining_amount: remaining,
            months_remaining,
            estimated_completion: months_remaining
                .map(|months| add_months(self.next_deposit, months)),
        }
    }
}
