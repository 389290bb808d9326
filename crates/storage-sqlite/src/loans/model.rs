//! Database models for loans.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use autosave_core::errors::{Error, Result};
use autosave_core::loans::{Loan, NewLoan, NewPayment, Payment};

use crate::utils::{decimal_column, enum_column};

#[derive(
    Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct LoanDB {
    pub id: i64,
    pub name: String,
    pub debt: String,
    pub rate: String,
    pub monthly_payment: String,
    pub next_payment: NaiveDate,
    pub bank_id: String,
    pub auto_payment: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::loans)]
pub struct NewLoanDB {
    pub name: String,
    pub debt: String,
    pub rate: String,
    pub monthly_payment: String,
    pub next_payment: NaiveDate,
    pub bank_id: String,
    pub auto_payment: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(
    Queryable,
    Identifiable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(LoanDB, foreign_key = loan_id))]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PaymentDB {
    pub id: i64,
    pub loan_id: i64,
    pub amount: String,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPaymentDB {
    pub loan_id: i64,
    pub amount: String,
    pub date: NaiveDate,
    pub status: String,
}

impl LoanDB {
    /// Builds the domain loan; `payment_history` must already be newest first.
    pub fn into_domain(self, payment_history: Vec<Payment>) -> Result<Loan> {
        Ok(Loan {
            debt: decimal_column(&self.debt, "loans.debt")?,
            rate: decimal_column(&self.rate, "loans.rate")?,
            monthly_payment: decimal_column(&self.monthly_payment, "loans.monthly_payment")?,
            id: self.id,
            name: self.name,
            next_payment: self.next_payment,
            bank_id: self.bank_id,
            auto_payment: self.auto_payment,
            payment_history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<PaymentDB> for Payment {
    type Error = Error;

    fn try_from(db: PaymentDB) -> Result<Self> {
        Ok(Self {
            amount: decimal_column(&db.amount, "payments.amount")?,
            status: enum_column(&db.status, "payments.status")?,
            id: db.id,
            loan_id: db.loan_id,
            date: db.date,
        })
    }
}

impl NewLoanDB {
    pub fn from_domain(domain: NewLoan, now: NaiveDateTime) -> Self {
        Self {
            name: domain.name,
            debt: domain.debt.to_string(),
            rate: domain.rate.to_string(),
            monthly_payment: domain.monthly_payment.to_string(),
            next_payment: domain.next_payment,
            bank_id: domain.bank_id,
            auto_payment: domain.auto_payment,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Loan> for NewLoanDB {
    fn from(loan: &Loan) -> Self {
        Self {
            name: loan.name.clone(),
            debt: loan.debt.to_string(),
            rate: loan.rate.to_string(),
            monthly_payment: loan.monthly_payment.to_string(),
            next_payment: loan.next_payment,
            bank_id: loan.bank_id.clone(),
            auto_payment: loan.auto_payment,
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

impl From<NewPayment> for NewPaymentDB {
    fn from(domain: NewPayment) -> Self {
        Self {
            loan_id: domain.loan_id,
            amount: domain.amount.to_string(),
            date: domain.date,
            status: domain.status.as_str().to_string(),
        }
    }
}
