//! Loan domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::operations::MovementStatus;

/// An outstanding debt with a monthly payment schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i64,
    pub name: String,
    pub debt: Decimal,
    /// Annual interest rate, in percent.
    pub rate: Decimal,
    pub monthly_payment: Decimal,
    pub next_payment: NaiveDate,
    pub bank_id: String,
    pub auto_payment: bool,
    /// Newest first.
    pub payment_history: Vec<Payment>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Loan {
    pub fn is_paid_off(&self) -> bool {
        self.debt <= Decimal::ZERO
    }
}

/// Input model for creating a loan. Payment history always starts empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub name: String,
    pub debt: Decimal,
    pub rate: Decimal,
    pub monthly_payment: Decimal,
    pub next_payment: NaiveDate,
    pub bank_id: String,
    #[serde(default)]
    pub auto_payment: bool,
}

impl NewLoan {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_non_negative("Debt", self.debt)?;
        validate_non_negative("Rate", self.rate)?;
        validate_non_negative("Monthly payment", self.monthly_payment)?;
        if self.bank_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "bankId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Partial update for a loan. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanUpdate {
    pub name: Option<String>,
    pub debt: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub monthly_payment: Option<Decimal>,
    pub next_payment: Option<NaiveDate>,
    pub bank_id: Option<String>,
    pub auto_payment: Option<bool>,
}

impl LoanUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(debt) = self.debt {
            validate_non_negative("Debt", debt)?;
        }
        if let Some(rate) = self.rate {
            validate_non_negative("Rate", rate)?;
        }
        if let Some(monthly) = self.monthly_payment {
            validate_non_negative("Monthly payment", monthly)?;
        }
        if let Some(bank_id) = &self.bank_id {
            if bank_id.trim().is_empty() {
                return Err(Error::invalid_input("Bank id cannot be empty"));
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, loan: &mut Loan) {
        if let Some(name) = &self.name {
            loan.name = name.clone();
        }
        if let Some(debt) = self.debt {
            loan.debt = debt;
        }
        if let Some(rate) = self.rate {
            loan.rate = rate;
        }
        if let Some(monthly) = self.monthly_payment {
            loan.monthly_payment = monthly;
        }
        if let Some(next_payment) = self.next_payment {
            loan.next_payment = next_payment;
        }
        if let Some(bank_id) = &self.bank_id {
            loan.bank_id = bank_id.clone();
        }
        if let Some(auto_payment) = self.auto_payment {
            loan.auto_payment = auto_payment;
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Loan name cannot be empty"));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::invalid_input(format!("{} cannot be negative", field)));
    }
    Ok(())
}

/// One payment made toward a loan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub loan_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: MovementStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub loan_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: MovementStatus,
}

impl NewPayment {
    pub fn into_payment(self, id: i64) -> Payment {
        Payment {
            id,
            loan_id: self.loan_id,
            amount: self.amount,
            date: self.date,
            status: self.status,
        }
    }
}
