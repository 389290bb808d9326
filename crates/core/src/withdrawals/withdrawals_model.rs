//! Emergency withdrawal models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{Account, Transaction};
use crate::goals::Goal;
use crate::operations::Operation;

/// Consequences of withdrawing `amount` from the withdrawal-source goal,
/// shown to the user before anything moves.
///
/// The plan is bound to the goal version it was computed from and can be
/// confirmed once, before `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyWithdrawPlan {
    pub token: Uuid,
    pub amount: Decimal,
    pub goal_id: i64,
    pub goal_name: String,
    pub goal_version: i64,
    /// 1-based indices of the deposits that would be closed.
    pub deposits_to_close: Vec<u32>,
    pub amount_per_deposit: Decimal,
    pub lost_interest: Decimal,
    /// Ids of the goals whose deposit timeline shifts.
    pub affected_goals: Vec<i64>,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl EmergencyWithdrawPlan {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now > self.expires_at
    }
}

/// Everything a confirmed withdrawal changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalOutcome {
    pub goal: Goal,
    pub account: Account,
    pub transaction: Transaction,
    pub operation: Operation,
}
