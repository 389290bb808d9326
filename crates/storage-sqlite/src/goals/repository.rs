use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use autosave_core::errors::{Error, Result};
use autosave_core::goals::goals_ordering::{assign_orders, compacted_orders, validate_permutation};
use autosave_core::goals::{Deposit, Goal, GoalRepositoryTrait, GoalUpdate, NewDeposit, NewGoal};
use autosave_core::ledger::GoalBalanceChange;
use autosave_core::utils::time_utils::now_naive;

use super::model::{DepositDB, GoalChangesetDB, GoalDB, NewDepositDB, NewGoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{deposits, goals};

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

fn load_goal(conn: &mut SqliteConnection, goal_id: i64) -> Result<Goal> {
    let row = goals::table
        .find(goal_id)
        .select(GoalDB::as_select())
        .first::<GoalDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found("Goal", goal_id))?;
    Goal::try_from(row)
}

fn load_goals_by_order(conn: &mut SqliteConnection) -> Result<Vec<Goal>> {
    goals::table
        .select(GoalDB::as_select())
        .order((goals::sort_order.asc(), goals::id.asc()))
        .load::<GoalDB>(conn)
        .into_core()?
        .into_iter()
        .map(Goal::try_from)
        .collect()
}

/// Moves a goal to `order`. Order-only writes leave the version alone.
fn set_order(
    conn: &mut SqliteConnection,
    goal_id: i64,
    order: i32,
    now: NaiveDateTime,
) -> Result<()> {
    diesel::update(
        goals::table
            .find(goal_id)
            .filter(goals::sort_order.ne(order)),
    )
    .set((goals::sort_order.eq(order), goals::updated_at.eq(now)))
    .execute(conn)
    .into_core()?;
    Ok(())
}

/// Applies a ledger balance change, refusing it if the goal moved past the
/// version the caller read. The balance never drops below zero.
pub(crate) fn apply_balance_change_in(
    conn: &mut SqliteConnection,
    change: GoalBalanceChange,
    now: NaiveDateTime,
) -> Result<Goal> {
    let goal = load_goal(conn, change.goal_id)?;
    if goal.version != change.expected_version {
        return Err(Error::Conflict(format!(
            "Goal '{}' changed since it was read (version {} != {})",
            goal.name, goal.version, change.expected_version
        )));
    }

    let current_amount = (goal.current_amount + change.delta).max(Decimal::ZERO);
    let next_deposit = change.next_deposit.unwrap_or(goal.next_deposit);
    let version = goal.version + 1;

    let updated = diesel::update(
        goals::table
            .find(goal.id)
            .filter(goals::version.eq(change.expected_version)),
    )
    .set((
        goals::current_amount.eq(current_amount.to_string()),
        goals::next_deposit.eq(next_deposit),
        goals::version.eq(version),
        goals::updated_at.eq(now),
    ))
    .execute(conn)
    .into_core()?;
    if updated == 0 {
        return Err(Error::Conflict(format!(
            "Goal '{}' changed while it was being updated",
            goal.name
        )));
    }

    Ok(Goal {
        current_amount,
        next_deposit,
        version,
        updated_at: now,
        ..goal
    })
}

pub(crate) fn insert_deposit_in(
    conn: &mut SqliteConnection,
    new_deposit: NewDeposit,
) -> Result<Deposit> {
    load_goal(conn, new_deposit.goal_id)?;
    let row = diesel::insert_into(deposits::table)
        .values(&NewDepositDB::from(new_deposit))
        .returning(DepositDB::as_returning())
        .get_result::<DepositDB>(conn)
        .into_core()?;
    Deposit::try_from(row)
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn list(&self) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        load_goals_by_order(&mut conn)
    }

    fn get_by_id(&self, goal_id: i64) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        load_goal(&mut conn, goal_id)
    }

    async fn insert(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn| {
                let existing: i64 = goals::table.count().get_result(conn).into_core()?;
                let order = i32::try_from(existing + 1).map_err(|_| {
                    Error::Unexpected("Too many goals to assign an order".to_string())
                })?;

                let row = diesel::insert_into(goals::table)
                    .values(&NewGoalDB::from_domain(new_goal, order, now_naive()))
                    .returning(GoalDB::as_returning())
                    .get_result::<GoalDB>(conn)
                    .into_core()?;
                Goal::try_from(row)
            })
            .await
    }

    async fn update(&self, goal_id: i64, update: GoalUpdate) -> Result<Goal> {
        self.writer
            .exec(move |conn| {
                let mut goal = load_goal(conn, goal_id)?;
                update.apply_to(&mut goal);
                goal.version += 1;
                goal.updated_at = now_naive();

                diesel::update(goals::table.find(goal_id))
                    .set(&GoalChangesetDB::from(&goal))
                    .execute(conn)
                    .into_core()?;
                Ok(goal)
            })
            .await
    }

    async fn delete(&self, goal_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let Some(removed) = goals::table
                    .find(goal_id)
                    .select(goals::sort_order)
                    .first::<i32>(conn)
                    .optional()
                    .into_core()?
                else {
                    return Ok(0);
                };

                diesel::delete(deposits::table.filter(deposits::goal_id.eq(goal_id)))
                    .execute(conn)
                    .into_core()?;
                let deleted = diesel::delete(goals::table.find(goal_id))
                    .execute(conn)
                    .into_core()?;

                let remaining: Vec<(i64, i32)> = goals::table
                    .select((goals::id, goals::sort_order))
                    .load(conn)
                    .into_core()?;
                let now = now_naive();
                for (id, order) in compacted_orders(&remaining, removed) {
                    set_order(conn, id, order, now)?;
                }
                Ok(deleted)
            })
            .await
    }

    async fn apply_ordering(&self, ordered_ids: Vec<i64>) -> Result<Vec<Goal>> {
        self.writer
            .exec(move |conn| {
                let existing: Vec<i64> = goals::table
                    .select(goals::id)
                    .load(conn)
                    .into_core()?;
                validate_permutation(&existing, &ordered_ids)?;

                let now = now_naive();
                for (id, order) in assign_orders(&ordered_ids) {
                    set_order(conn, id, order, now)?;
                }
                load_goals_by_order(conn)
            })
            .await
    }

    fn list_deposits(&self, goal_id: i64) -> Result<Vec<Deposit>> {
        let mut conn = get_connection(&self.pool)?;
        deposits::table
            .filter(deposits::goal_id.eq(goal_id))
            .select(DepositDB::as_select())
            .order(deposits::id.desc())
            .load::<DepositDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Deposit::try_from)
            .collect()
    }
}
