//! Operation log domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Lifecycle state shared by operations, deposits and loan payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    Pending,
    Completed,
    Failed,
}

impl MovementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::Pending => "pending",
            MovementStatus::Completed => "completed",
            MovementStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(MovementStatus::Pending),
            "completed" => Ok(MovementStatus::Completed),
            "failed" => Ok(MovementStatus::Failed),
            other => Err(Error::invalid_input(format!(
                "Unknown movement status '{}'",
                other
            ))),
        }
    }
}

/// Kind of fund movement recorded in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Deposit,
    LoanPayment,
    EmergencyWithdraw,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::LoanPayment => "loan_payment",
            OperationType::EmergencyWithdraw => "emergency_withdraw",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deposit" => Ok(OperationType::Deposit),
            "loan_payment" => Ok(OperationType::LoanPayment),
            "emergency_withdraw" => Ok(OperationType::EmergencyWithdraw),
            other => Err(Error::invalid_input(format!(
                "Unknown operation type '{}'",
                other
            ))),
        }
    }
}

/// An entry of the global, append-only operation log.
///
/// `goal` and `loan` hold display names captured when the operation was
/// written; they are not references and survive renames or deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: i64,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub amount: Decimal,
    pub goal: Option<String>,
    pub loan: Option<String>,
    pub status: MovementStatus,
    pub error: Option<String>,
}

/// Input model for appending an operation. The store assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOperation {
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub amount: Decimal,
    pub goal: Option<String>,
    pub loan: Option<String>,
    pub status: MovementStatus,
    pub error: Option<String>,
}

impl NewOperation {
    pub fn completed(
        date: NaiveDateTime,
        operation_type: OperationType,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            operation_type,
            amount,
            goal: None,
            loan: None,
            status: MovementStatus::Completed,
            error: None,
        }
    }

    pub fn failed(
        date: NaiveDateTime,
        operation_type: OperationType,
        amount: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: MovementStatus::Failed,
            error: Some(reason.into()),
            ..Self::completed(date, operation_type, amount)
        }
    }

    pub fn for_goal(mut self, goal_name: impl Into<String>) -> Self {
        self.goal = Some(goal_name.into());
        self
    }

    pub fn for_loan(mut self, loan_name: impl Into<String>) -> Self {
        self.loan = Some(loan_name.into());
        self
    }

    pub fn into_operation(self, id: i64) -> Operation {
        Operation {
            id,
            date: self.date,
            operation_type: self.operation_type,
            amount: self.amount,
            goal: self.goal,
            loan: self.loan,
            status: self.status,
            error: self.error,
        }
    }
}

/// Sorts operations for display: newest first, later ids first on equal dates.
pub fn sort_for_display(operations: &mut [Operation]) {
    operations.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
