//! Database models for accounts.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use autosave_core::accounts::{Account, NewTransaction, Transaction};
use autosave_core::errors::{Error, Result};

use crate::utils::{decimal_column, enum_column};

/// Database model for accounts
#[derive(
    Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: i64,
    pub bank_id: String,
    pub number: String,
    pub balance: String,
    pub created_at: NaiveDateTime,
}

/// Database model for creating an account. The balance starts at zero and
/// only moves through transactions.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct NewAccountDB {
    pub bank_id: String,
    pub number: String,
    pub balance: String,
    pub created_at: NaiveDateTime,
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
#[diesel(belongs_to(AccountDB, foreign_key = account_id))]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: String,
    pub transaction_type: String,
    pub category: Option<String>,
    pub sender: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransactionDB {
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: String,
    pub transaction_type: String,
    pub category: Option<String>,
    pub sender: Option<String>,
}

impl TryFrom<AccountDB> for Account {
    type Error = Error;

    fn try_from(db: AccountDB) -> Result<Self> {
        Ok(Self {
            balance: decimal_column(&db.balance, "accounts.balance")?,
            id: db.id,
            bank_id: db.bank_id,
            number: db.number,
            created_at: db.created_at,
        })
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self> {
        Ok(Self {
            amount: decimal_column(&db.amount, "transactions.amount")?,
            transaction_type: enum_column(&db.transaction_type, "transactions.transaction_type")?,
            id: db.id,
            account_id: db.account_id,
            date: db.date,
            description: db.description,
            category: db.category,
            sender: db.sender,
        })
    }
}

impl NewTransactionDB {
    pub fn from_domain(account_id: i64, domain: NewTransaction) -> Self {
        Self {
            account_id,
            date: domain.date,
            description: domain.description,
            amount: domain.amount.to_string(),
            transaction_type: domain.transaction_type.as_str().to_string(),
            category: domain.category,
            sender: domain.sender,
        }
    }
}
