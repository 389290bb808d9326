//! Property-based integration tests for the ledger engine.
//!
//! These tests run random operation sequences against the in-memory backend
//! and check the invariants that must survive any of them.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

use autosave_core::accounts::{AccountRepositoryTrait, NewAccount, NewTransaction};
use autosave_core::goals::goals_ordering::is_dense;
use autosave_core::goals::{
    GoalRepositoryTrait, GoalService, GoalServiceTrait, MoveDirection, NewDeposit, NewGoal,
};
use autosave_core::ledger::{AccountEntry, GoalBalanceChange, LedgerCommit, LedgerRepositoryTrait};
use autosave_core::memory::InMemoryStore;
use autosave_core::operations::MovementStatus;
use autosave_core::settings::{SettingsRepositoryTrait, SettingsUpdate};
use autosave_core::withdrawals::{
    deposits_to_close, EmergencyWithdrawalService, EmergencyWithdrawalServiceTrait,
};

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
enum GoalOp {
    Create,
    Delete(usize),
    Move(usize, MoveDirection),
    Reorder(Vec<usize>),
}

fn arb_direction() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![Just(MoveDirection::Up), Just(MoveDirection::Down)]
}

fn arb_goal_op() -> impl Strategy<Value = GoalOp> {
    prop_oneof![
        3 => Just(GoalOp::Create),
        1 => any::<usize>().prop_map(GoalOp::Delete),
        2 => (any::<usize>(), arb_direction()).prop_map(|(i, d)| GoalOp::Move(i, d)),
        1 => proptest::collection::vec(any::<usize>(), 0..8).prop_map(GoalOp::Reorder),
    ]
}

/// Whole-unit money amounts, in minor-unit precision.
fn arb_amount(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..=max * 100).prop_map(|cents| Decimal::new(cents, 2))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn new_goal(n: usize) -> NewGoal {
    NewGoal {
        name: format!("Goal {}", n),
        target_amount: Decimal::new(100_000, 0),
        monthly_amount: Decimal::new(5_000, 0),
        next_deposit: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        bank_id: "vbank".to_string(),
    }
}

/// Permutes `ids` by sorting them on the generated keys.
fn shuffled(ids: &[i64], keys: &[usize]) -> Vec<i64> {
    let mut keyed: Vec<(usize, i64)> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (keys.get(i).copied().unwrap_or(i), *id))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, id)| id).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Orders stay exactly 1..=N, and deletes and moves keep the relative
    /// sequence of the goals they do not touch.
    #[test]
    fn goal_orders_stay_dense(ops in proptest::collection::vec(arb_goal_op(), 1..40)) {
        runtime().block_on(async {
            let store = InMemoryStore::new();
            store
                .accounts()
                .create(NewAccount {
                    bank_id: "vbank".to_string(),
                    number: "1".to_string(),
                    opening_balance: Decimal::ZERO,
                })
                .await
                .unwrap();
            let service = GoalService::new(store.goals(), store.accounts());

            for (step, op) in ops.into_iter().enumerate() {
                let before: Vec<i64> = service.get_goals().unwrap().iter().map(|g| g.id).collect();
                match op {
                    GoalOp::Create => {
                        service.create_goal(new_goal(step)).await.unwrap();
                    }
                    GoalOp::Delete(i) if !before.is_empty() => {
                        let target = before[i % before.len()];
                        service.delete_goal(target).await.unwrap();
                        let after: Vec<i64> = service.get_goals().unwrap().iter().map(|g| g.id).collect();
                        let expected: Vec<i64> = before.iter().copied().filter(|id| *id != target).collect();
                        prop_assert_eq!(after, expected);
                    }
                    GoalOp::Move(i, direction) if !before.is_empty() => {
                        let target = before[i % before.len()];
                        service.move_goal(target, direction).await.unwrap();
                    }
                    GoalOp::Reorder(keys) => {
                        let requested = shuffled(&before, &keys);
                        service.reorder_goals(requested.clone()).await.unwrap();
                        let after: Vec<i64> = service.get_goals().unwrap().iter().map(|g| g.id).collect();
                        prop_assert_eq!(after, requested);
                    }
                    _ => {}
                }

                let orders: Vec<i32> = service.get_goals().unwrap().iter().map(|g| g.order).collect();
                prop_assert!(is_dense(&orders), "orders not dense: {:?}", orders);
            }
            Ok(())
        })?;
    }

    /// A confirmed withdrawal moves exactly `amount` from the goal to the home
    /// account; a plan alone changes nothing.
    #[test]
    fn withdrawal_conserves_funds(
        balance in arb_amount(100_000),
        fraction in 1u32..=100,
        deposits in 0u32..12,
    ) {
        runtime().block_on(async {
            let store = InMemoryStore::new();
            let accounts = store.accounts();
            let savings = accounts
                .create(NewAccount {
                    bank_id: "vbank".to_string(),
                    number: "savings".to_string(),
                    opening_balance: balance,
                })
                .await
                .unwrap();
            let home = accounts
                .create(NewAccount {
                    bank_id: "abank".to_string(),
                    number: "home".to_string(),
                    opening_balance: Decimal::ZERO,
                })
                .await
                .unwrap();
            let goal = store.goals().insert(new_goal(0)).await.unwrap();
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

            store
                .ledger()
                .commit(LedgerCommit {
                    goal_changes: vec![GoalBalanceChange {
                        goal_id: goal.id,
                        expected_version: goal.version,
                        delta: balance,
                        next_deposit: None,
                    }],
                    account_entries: vec![AccountEntry {
                        account_id: savings.id,
                        transaction: NewTransaction::new(date, "Savings", -balance),
                    }],
                    deposits: (0..deposits)
                        .map(|_| NewDeposit {
                            goal_id: goal.id,
                            amount: balance / Decimal::from(deposits),
                            date,
                            status: MovementStatus::Completed,
                        })
                        .collect(),
                    ..Default::default()
                })
                .await
                .unwrap();
            store
                .settings()
                .update_settings(&SettingsUpdate {
                    home_account_id: Some(home.id),
                    withdrawal_source_goal_id: Some(goal.id),
                    ..Default::default()
                })
                .await
                .unwrap();

            let service = Arc::new(EmergencyWithdrawalService::new(
                store.goals(),
                store.accounts(),
                store.operations(),
                store.settings(),
                store.ledger(),
            ));

            let amount = (balance * Decimal::from(fraction) / Decimal::from(100u32))
                .round_dp(2)
                .max(Decimal::new(1, 2));
            let before = store.snapshot();
            let plan = service.plan(amount).unwrap();
            prop_assert_eq!(store.snapshot(), before);
            prop_assert!(!plan.deposits_to_close.is_empty());
            prop_assert!(plan.deposits_to_close.len() as u32 <= deposits.max(1));

            service.confirm(&plan).await.unwrap();
            let goal_after = store.goals().get_by_id(goal.id).unwrap();
            let home_after = store.accounts().get_by_id(home.id).unwrap();
            prop_assert_eq!(goal_after.current_amount, balance - amount);
            prop_assert_eq!(home_after.balance, amount);
            Ok(())
        })?;
    }

    /// The deposit count to close is always within 1..=count.
    #[test]
    fn deposits_to_close_is_bounded(
        current in arb_amount(1_000_000),
        fraction in 1u32..=100,
        count in 0u32..50,
    ) {
        let amount = (current * Decimal::from(fraction) / Decimal::from(100u32)).max(Decimal::new(1, 2));
        let closed = deposits_to_close(amount, current, count);
        prop_assert!(closed >= 1);
        prop_assert!(closed <= count.max(1));
    }
}
