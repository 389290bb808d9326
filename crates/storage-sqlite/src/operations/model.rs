//! Database models for the operation log.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use autosave_core::errors::{Error, Result};
use autosave_core::operations::{NewOperation, Operation};

use crate::utils::{decimal_column, enum_column};

#[derive(
    Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::operations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct OperationDB {
    pub id: i64,
    pub date: NaiveDateTime,
    pub operation_type: String,
    pub amount: String,
    pub goal_name: Option<String>,
    pub loan_name: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::operations)]
pub struct NewOperationDB {
    pub date: NaiveDateTime,
    pub operation_type: String,
    pub amount: String,
    pub goal_name: Option<String>,
    pub loan_name: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

impl TryFrom<OperationDB> for Operation {
    type Error = Error;

    fn try_from(db: OperationDB) -> Result<Self> {
        Ok(Self {
            operation_type: enum_column(&db.operation_type, "operations.operation_type")?,
            amount: decimal_column(&db.amount, "operations.amount")?,
            status: enum_column(&db.status, "operations.status")?,
            id: db.id,
            date: db.date,
            goal: db.goal_name,
            loan: db.loan_name,
            error: db.error,
        })
    }
}

impl From<NewOperation> for NewOperationDB {
    fn from(domain: NewOperation) -> Self {
        Self {
            date: domain.date,
            operation_type: domain.operation_type.as_str().to_string(),
            amount: domain.amount.to_string(),
            goal_name: domain.goal,
            loan_name: domain.loan,
            status: domain.status.as_str().to_string(),
            error: domain.error,
        }
    }
}
