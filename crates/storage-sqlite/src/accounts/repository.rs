use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use autosave_core::accounts::{
    Account, AccountRepositoryTrait, NewAccount, NewTransaction, Transaction,
};
use autosave_core::constants::OPENING_BALANCE_DESCRIPTION;
use autosave_core::errors::{Error, Result};
use autosave_core::utils::time_utils::now_naive;

use super::model::{AccountDB, NewAccountDB, NewTransactionDB, TransactionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{accounts, transactions};

/// Repository for accounts and their transaction history.
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

pub(crate) fn load_account(conn: &mut SqliteConnection, account_id: i64) -> Result<Account> {
    let row = accounts::table
        .find(account_id)
        .select(AccountDB::as_select())
        .first::<AccountDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found("Account", account_id))?;
    Account::try_from(row)
}

/// Appends a transaction and moves the account balance by its amount.
///
/// With `guard_overdraft`, a debit larger than the balance fails with
/// `InsufficientFunds` before anything is written.
pub(crate) fn append_transaction_in(
    conn: &mut SqliteConnection,
    account_id: i64,
    new_transaction: NewTransaction,
    guard_overdraft: bool,
) -> Result<(Account, Transaction)> {
    new_transaction.validate()?;
    let account = load_account(conn, account_id)?;

    let amount = new_transaction.amount;
    if guard_overdraft && amount < Decimal::ZERO && account.balance + amount < Decimal::ZERO {
        return Err(Error::InsufficientFunds {
            requested: -amount,
            available: account.balance,
        });
    }
    let balance = account.balance + amount;

    diesel::update(accounts::table.find(account_id))
        .set(accounts::balance.eq(balance.to_string()))
        .execute(conn)
        .into_core()?;

    let row = diesel::insert_into(transactions::table)
        .values(&NewTransactionDB::from_domain(account_id, new_transaction))
        .returning(TransactionDB::as_returning())
        .get_result::<TransactionDB>(conn)
        .into_core()?;

    Ok((Account { balance, ..account }, Transaction::try_from(row)?))
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        self.writer
            .exec(move |conn| {
                let now = now_naive();
                let row = diesel::insert_into(accounts::table)
                    .values(&NewAccountDB {
                        bank_id: new_account.bank_id,
                        number: new_account.number,
                        balance: Decimal::ZERO.to_string(),
                        created_at: now,
                    })
                    .returning(AccountDB::as_returning())
                    .get_result::<AccountDB>(conn)
                    .into_core()?;

                if new_account.opening_balance.is_zero() {
                    return Account::try_from(row);
                }
                let opening = NewTransaction::new(
                    now.date(),
                    OPENING_BALANCE_DESCRIPTION,
                    new_account.opening_balance,
                );
                let (account, _) = append_transaction_in(conn, row.id, opening, false)?;
                Ok(account)
            })
            .await
    }

    async fn delete(&self, account_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                diesel::delete(transactions::table.filter(transactions::account_id.eq(account_id)))
                    .execute(conn)
                    .into_core()?;
                diesel::delete(accounts::table.find(account_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn get_by_id(&self, account_id: i64) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        load_account(&mut conn, account_id)
    }

    fn list(&self) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        accounts::table
            .select(AccountDB::as_select())
            .order(accounts::id.asc())
            .load::<AccountDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    fn list_transactions(&self, account_id: i64) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        transactions::table
            .filter(transactions::account_id.eq(account_id))
            .select(TransactionDB::as_select())
            .order(transactions::id.desc())
            .load::<TransactionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn append_transaction(
        &self,
        account_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                append_transaction_in(conn, account_id, new_transaction, false)
                    .map(|(_, transaction)| transaction)
            })
            .await
    }
}
