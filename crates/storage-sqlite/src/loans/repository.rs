use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use autosave_core::errors::{Error, Result};
use autosave_core::ledger::LoanDebtChange;
use autosave_core::loans::{Loan, LoanRepositoryTrait, LoanUpdate, NewLoan, NewPayment, Payment};
use autosave_core::utils::time_utils::now_naive;

use super::model::{LoanDB, NewLoanDB, NewPaymentDB, PaymentDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{loans, payments};

pub struct LoanRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LoanRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn payments_of(conn: &mut SqliteConnection, loan_id: i64) -> Result<Vec<Payment>> {
    payments::table
        .filter(payments::loan_id.eq(loan_id))
        .select(PaymentDB::as_select())
        .order(payments::id.desc())
        .load::<PaymentDB>(conn)
        .into_core()?
        .into_iter()
        .map(Payment::try_from)
        .collect()
}

/// Loads a loan together with its payment history.
pub(crate) fn load_loan(conn: &mut SqliteConnection, loan_id: i64) -> Result<Loan> {
    let row = loans::table
        .find(loan_id)
        .select(LoanDB::as_select())
        .first::<LoanDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found("Loan", loan_id))?;
    let history = payments_of(conn, loan_id)?;
    row.into_domain(history)
}

/// Moves a loan's debt by the change's delta, flooring it at zero.
pub(crate) fn apply_debt_change_in(
    conn: &mut SqliteConnection,
    change: LoanDebtChange,
    now: NaiveDateTime,
) -> Result<()> {
    let loan = load_loan(conn, change.loan_id)?;
    let debt = (loan.debt + change.delta).max(Decimal::ZERO);
    let next_payment = change.next_payment.unwrap_or(loan.next_payment);

    diesel::update(loans::table.find(loan.id))
        .set((
            loans::debt.eq(debt.to_string()),
            loans::next_payment.eq(next_payment),
            loans::updated_at.eq(now),
        ))
        .execute(conn)
        .into_core()?;
    Ok(())
}

pub(crate) fn insert_payment_in(
    conn: &mut SqliteConnection,
    new_payment: NewPayment,
) -> Result<Payment> {
    let exists = loans::table
        .find(new_payment.loan_id)
        .select(loans::id)
        .first::<i64>(conn)
        .optional()
        .into_core()?;
    if exists.is_none() {
        return Err(Error::not_found("Loan", new_payment.loan_id));
    }

    let row = diesel::insert_into(payments::table)
        .values(&NewPaymentDB::from(new_payment))
        .returning(PaymentDB::as_returning())
        .get_result::<PaymentDB>(conn)
        .into_core()?;
    Payment::try_from(row)
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    fn list(&self) -> Result<Vec<Loan>> {
        let mut conn = get_connection(&self.pool)?;
        let ids: Vec<i64> = loans::table
            .select(loans::id)
            .order(loans::id.asc())
            .load(&mut conn)
            .into_core()?;
        ids.into_iter()
            .map(|loan_id| load_loan(&mut conn, loan_id))
            .collect()
    }

    fn get_by_id(&self, loan_id: i64) -> Result<Loan> {
        let mut conn = get_connection(&self.pool)?;
        load_loan(&mut conn, loan_id)
    }

    async fn insert(&self, new_loan: NewLoan) -> Result<Loan> {
        self.writer
            .exec(move |conn| {
                let row = diesel::insert_into(loans::table)
                    .values(&NewLoanDB::from_domain(new_loan, now_naive()))
                    .returning(LoanDB::as_returning())
                    .get_result::<LoanDB>(conn)
                    .into_core()?;
                row.into_domain(Vec::new())
            })
            .await
    }

    async fn update(&self, loan_id: i64, update: LoanUpdate) -> Result<Loan> {
        self.writer
            .exec(move |conn| {
                let mut loan = load_loan(conn, loan_id)?;
                update.apply_to(&mut loan);
                loan.updated_at = now_naive();

                diesel::update(loans::table.find(loan_id))
                    .set(&NewLoanDB::from(&loan))
                    .execute(conn)
                    .into_core()?;
                Ok(loan)
            })
            .await
    }

    async fn delete(&self, loan_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                diesel::delete(payments::table.filter(payments::loan_id.eq(loan_id)))
                    .execute(conn)
                    .into_core()?;
                diesel::delete(loans::table.find(loan_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn list_payments(&self, loan_id: i64) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        payments_of(&mut conn, loan_id)
    }
}
