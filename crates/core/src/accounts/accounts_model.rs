//! Account domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{errors::ValidationError, Error, Result};

/// Direction of an account transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Transaction type implied by the sign of a non-zero amount.
    pub fn for_amount(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::invalid_input(format!(
                "Unknown transaction type '{}'",
                other
            ))),
        }
    }
}

/// Domain model representing a linked bank account.
///
/// `balance` always equals the sum of the account's transaction amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub bank_id: String,
    pub number: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
}

/// Input model for creating an account, supplied by the bank connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub bank_id: String,
    pub number: String,
    /// Recorded as an income transaction so the balance stays derivable.
    #[serde(default)]
    pub opening_balance: Decimal,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.bank_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "bankId".to_string(),
            )));
        }
        if self.number.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account number cannot be empty".to_string(),
            )));
        }
        if self.opening_balance.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Opening balance cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// An immutable entry of an account's transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub sender: Option<String>,
}

/// Input model for a transaction. The store assigns `id` and `account_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub sender: Option<String>,
}

impl NewTransaction {
    /// Builds a transaction whose type follows the sign of `amount`.
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            transaction_type: TransactionType::for_amount(amount),
            category: None,
            sender: None,
        }
    }

    /// Validates that the amount is non-zero and its sign matches the type.
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_zero() {
            return Err(Error::invalid_input("Transaction amount cannot be zero"));
        }
        let sign_matches = match self.transaction_type {
            TransactionType::Income => self.amount.is_sign_positive(),
            TransactionType::Expense => self.amount.is_sign_negative(),
        };
        if !sign_matches {
            return Err(Error::invalid_input(format!(
                "Amount {} does not match transaction type '{}'",
                self.amount, self.transaction_type
            )));
        }
        if self.description.trim().is_empty() {
            return Err(Error::invalid_input("Transaction description cannot be empty"));
        }
        Ok(())
    }

    pub fn into_transaction(self, id: i64, account_id: i64) -> Transaction {
        Transaction {
            id,
            account_id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category,
            sender: self.sender,
        }
    }
}
