use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use log::{debug, error, info, warn};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::withdrawals_model::{EmergencyWithdrawPlan, WithdrawalOutcome};
use super::withdrawals_traits::EmergencyWithdrawalServiceTrait;
use crate::accounts::{AccountRepositoryTrait, NewTransaction, TransactionType};
use crate::constants::setting_keys;
use crate::errors::{Error, Result};
use crate::goals::GoalRepositoryTrait;
use crate::ledger::{AccountEntry, GoalBalanceChange, LedgerCommit, LedgerRepositoryTrait};
use crate::operations::{MovementStatus, NewOperation, OperationRepositoryTrait, OperationType};
use crate::settings::SettingsRepositoryTrait;
use crate::utils::round_money;
use crate::utils::time_utils::{add_months, now_naive, today};

/// Transaction category of the income credited by a withdrawal.
const WITHDRAWAL_CATEGORY: &str = "emergency_withdrawal";

/// Number of deposits that cover `amount` when `current` is spread evenly
/// over `deposit_count` deposits. A goal without deposits counts as one.
///
/// Always between 1 and the deposit count.
pub fn deposits_to_close(amount: Decimal, current: Decimal, deposit_count: u32) -> u32 {
    let count = deposit_count.max(1);
    if current <= Decimal::ZERO {
        return count;
    }
    let per_deposit = current / Decimal::from(count);
    (amount / per_deposit)
        .ceil()
        .to_u32()
        .unwrap_or(count)
        .clamp(1, count)
}

/// Service for emergency withdrawals from the configured source goal.
///
/// Issued plans live in this service until confirmed or expired; a
/// confirmation consumes its plan even when it fails.
pub struct EmergencyWithdrawalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
    operation_repo: Arc<dyn OperationRepositoryTrait>,
    settings_repo: Arc<dyn SettingsRepositoryTrait>,
    ledger_repo: Arc<dyn LedgerRepositoryTrait>,
    plans: Mutex<HashMap<Uuid, EmergencyWithdrawPlan>>,
    commit_lock: tokio::sync::Mutex<()>,
}

impl EmergencyWithdrawalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
        operation_repo: Arc<dyn OperationRepositoryTrait>,
        settings_repo: Arc<dyn SettingsRepositoryTrait>,
        ledger_repo: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            goal_repo,
            account_repo,
            operation_repo,
            settings_repo,
            ledger_repo,
            plans: Mutex::new(HashMap::new()),
            commit_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn issued_plans(&self) -> Result<MutexGuard<'_, HashMap<Uuid, EmergencyWithdrawPlan>>> {
        self.plans
            .lock()
            .map_err(|_| Error::Unexpected("Withdrawal plan registry lock poisoned".to_string()))
    }

    /// Removes and returns the issued plan for `token`.
    fn take_plan(&self, token: &Uuid) -> Result<EmergencyWithdrawPlan> {
        self.issued_plans()?.remove(token).ok_or_else(|| {
            Error::Conflict(format!(
                "Withdrawal plan {} is unknown or was already used",
                token
            ))
        })
    }

    async fn apply(
        &self,
        issued: &EmergencyWithdrawPlan,
        submitted: &EmergencyWithdrawPlan,
    ) -> Result<WithdrawalOutcome> {
        if issued != submitted {
            return Err(Error::Conflict(
                "Submitted plan does not match the issued plan".to_string(),
            ));
        }
        if issued.is_expired(now_naive()) {
            return Err(Error::Conflict(format!(
                "Withdrawal plan expired at {}",
                issued.expires_at
            )));
        }

        let goal = self.goal_repo.get_by_id(issued.goal_id)?;
        if issued.amount > goal.current_amount {
            return Err(Error::InsufficientFunds {
                requested: issued.amount,
                available: goal.current_amount,
            });
        }
        if goal.version != issued.goal_version {
            return Err(Error::Conflict(format!(
                "Goal '{}' changed since the plan was made",
                goal.name
            )));
        }

        let settings = self.settings_repo.get_settings()?;
        let home_account_id = settings
            .home_account_id
            .ok_or_else(|| Error::MissingConfigKey(setting_keys::HOME_ACCOUNT_ID.to_string()))?;
        let home_account = self.account_repo.get_by_id(home_account_id)?;

        let commit = LedgerCommit {
            goal_changes: vec![GoalBalanceChange {
                goal_id: goal.id,
                expected_version: goal.version,
                delta: -issued.amount,
                next_deposit: Some(add_months(
                    goal.next_deposit,
                    settings.withdrawal_delay_months,
                )),
            }],
            account_entries: vec![AccountEntry {
                account_id: home_account.id,
                transaction: NewTransaction {
                    date: today(),
                    description: format!("Emergency withdrawal from goal '{}'", goal.name),
                    amount: issued.amount,
                    transaction_type: TransactionType::Income,
                    category: Some(WITHDRAWAL_CATEGORY.to_string()),
                    sender: Some(goal.name.clone()),
                },
            }],
            operations: vec![NewOperation::completed(
                now_naive(),
                OperationType::EmergencyWithdraw,
                issued.amount,
            )
            .for_goal(&goal.name)],
            ..Default::default()
        };

        let receipt = self.ledger_repo.commit(commit).await?;
        match (
            receipt.goals.into_iter().next(),
            receipt.accounts.into_iter().next(),
            receipt.transactions.into_iter().next(),
            receipt.operations.into_iter().next(),
        ) {
            (Some(goal), Some(account), Some(transaction), Some(operation)) => {
                Ok(WithdrawalOutcome {
                    goal,
                    account,
                    transaction,
                    operation,
                })
            }
            _ => Err(Error::Unexpected(
                "Ledger commit returned an incomplete receipt".to_string(),
            )),
        }
    }

    async fn record_failure(&self, plan: &EmergencyWithdrawPlan, reason: &Error) {
        let failed = NewOperation::failed(
            now_naive(),
            OperationType::EmergencyWithdraw,
            plan.amount,
            reason.to_string(),
        )
        .for_goal(&plan.goal_name);

        if let Err(e) = self.operation_repo.append(failed).await {
            error!(
                "Could not record failed emergency withdrawal from goal {}: {}",
                plan.goal_id, e
            );
        }
    }
}

#[async_trait]
impl EmergencyWithdrawalServiceTrait for EmergencyWithdrawalService {
    fn plan(&self, amount: Decimal) -> Result<EmergencyWithdrawPlan> {
        if amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Withdrawal amount must be positive"));
        }

        let settings = self.settings_repo.get_settings()?;
        let goal_id = settings.withdrawal_source_goal_id.ok_or_else(|| {
            Error::MissingConfigKey(setting_keys::WITHDRAWAL_SOURCE_GOAL_ID.to_string())
        })?;
        let goal = self.goal_repo.get_by_id(goal_id)?;
        if amount > goal.current_amount {
            return Err(Error::InsufficientFunds {
                requested: amount,
                available: goal.current_amount,
            });
        }

        let completed = self
            .goal_repo
            .list_deposits(goal_id)?
            .iter()
            .filter(|deposit| deposit.status == MovementStatus::Completed)
            .count();
        let deposit_count = u32::try_from(completed).unwrap_or(u32::MAX).max(1);
        let to_close = deposits_to_close(amount, goal.current_amount, deposit_count);

        let created_at = now_naive();
        let ttl = Duration::try_seconds(settings.plan_ttl_secs).unwrap_or(Duration::MAX);
        let plan = EmergencyWithdrawPlan {
            token: Uuid::new_v4(),
            amount,
            goal_id: goal.id,
            goal_name: goal.name.clone(),
            goal_version: goal.version,
            deposits_to_close: (1..=to_close).collect(),
            amount_per_deposit: round_money(goal.current_amount / Decimal::from(deposit_count)),
            lost_interest: round_money(amount * settings.withdrawal_penalty_rate),
            affected_goals: vec![goal.id],
            created_at,
            expires_at: created_at
                .checked_add_signed(ttl)
                .unwrap_or(NaiveDateTime::MAX),
        };

        let mut plans = self.issued_plans()?;
        plans.retain(|_, issued| !issued.is_expired(created_at));
        plans.insert(plan.token, plan.clone());

        debug!(
            "Planned withdrawal of {} from goal {}: closes {} of {} deposits, loses {}",
            amount, goal_id, to_close, deposit_count, plan.lost_interest
        );
        Ok(plan)
    }

    async fn confirm(&self, plan: &EmergencyWithdrawPlan) -> Result<WithdrawalOutcome> {
        let _guard = self.commit_lock.lock().await;

        let issued = match self.take_plan(&plan.token) {
            Ok(issued) => issued,
            Err(err) => {
                warn!("Emergency withdrawal of {} rejected: {}", plan.amount, err);
                self.record_failure(plan, &err).await;
                return Err(err);
            }
        };
        match self.apply(&issued, plan).await {
            Ok(outcome) => {
                info!(
                    "Withdrew {} from goal {} '{}' into account {}",
                    issued.amount, issued.goal_id, issued.goal_name, outcome.account.id
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "Emergency withdrawal of {} from goal {} rejected: {}",
                    issued.amount, issued.goal_id, err
                );
                self.record_failure(&issued, &err).await;
                Err(err)
            }
        }
    }
}
