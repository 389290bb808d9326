//! Database models for goals.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use autosave_core::errors::{Error, Result};
use autosave_core::goals::{Deposit, Goal, NewDeposit, NewGoal};

use crate::utils::{decimal_column, enum_column};

/// Database model for goals
#[derive(
    Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalDB {
    pub id: i64,
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub monthly_amount: String,
    pub next_deposit: NaiveDate,
    pub bank_id: String,
    pub sort_order: i32,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new goal
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct NewGoalDB {
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub monthly_amount: String,
    pub next_deposit: NaiveDate,
    pub bank_id: String,
    pub sort_order: i32,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editable goal columns, written back after a `GoalUpdate` is applied.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct GoalChangesetDB {
    pub name: String,
    pub target_amount: String,
    pub monthly_amount: String,
    pub next_deposit: NaiveDate,
    pub bank_id: String,
    pub version: i64,
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
#[diesel(belongs_to(GoalDB, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::deposits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DepositDB {
    pub id: i64,
    pub goal_id: i64,
    pub amount: String,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::deposits)]
pub struct NewDepositDB {
    pub goal_id: i64,
    pub amount: String,
    pub date: NaiveDate,
    pub status: String,
}

// Conversion to domain models
impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self> {
        Ok(Self {
            target_amount: decimal_column(&db.target_amount, "goals.target_amount")?,
            current_amount: decimal_column(&db.current_amount, "goals.current_amount")?,
            monthly_amount: decimal_column(&db.monthly_amount, "goals.monthly_amount")?,
            id: db.id,
            name: db.name,
            next_deposit: db.next_deposit,
            bank_id: db.bank_id,
            order: db.sort_order,
            version: db.version,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<DepositDB> for Deposit {
    type Error = Error;

    fn try_from(db: DepositDB) -> Result<Self> {
        Ok(Self {
            amount: decimal_column(&db.amount, "deposits.amount")?,
            status: enum_column(&db.status, "deposits.status")?,
            id: db.id,
            goal_id: db.goal_id,
            date: db.date,
        })
    }
}

impl NewGoalDB {
    pub fn from_domain(domain: NewGoal, sort_order: i32, now: NaiveDateTime) -> Self {
        Self {
            name: domain.name,
            target_amount: domain.target_amount.to_string(),
            current_amount: "0".to_string(),
            monthly_amount: domain.monthly_amount.to_string(),
            next_deposit: domain.next_deposit,
            bank_id: domain.bank_id,
            sort_order,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Goal> for GoalChangesetDB {
    fn from(goal: &Goal) -> Self {
        Self {
            name: goal.name.clone(),
            target_amount: goal.target_amount.to_string(),
            monthly_amount: goal.monthly_amount.to_string(),
            next_deposit: goal.next_deposit,
            bank_id: goal.bank_id.clone(),
            version: goal.version,
            updated_at: goal.updated_at,
        }
    }
}

impl From<NewDeposit> for NewDepositDB {
    fn from(domain: NewDeposit) -> Self {
        Self {
            goal_id: domain.goal_id,
            amount: domain.amount.to_string(),
            date: domain.date,
            status: domain.status.as_str().to_string(),
        }
    }
}
