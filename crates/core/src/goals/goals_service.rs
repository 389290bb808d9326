use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::goals_model::{Deposit, Goal, GoalProgress, GoalUpdate, MoveDirection, NewGoal};
use super::goals_ordering::{moved_ordering, validate_permutation};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result};

/// Service for managing savings goals and their priority order.
pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
}

impl GoalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        GoalService {
            goal_repo,
            account_repo,
        }
    }

    /// A goal can only be funded from a bank the user has an account with.
    fn ensure_bank_linked(&self, bank_id: &str) -> Result<()> {
        let linked = self
            .account_repo
            .list()?
            .iter()
            .any(|account| account.bank_id == bank_id);
        if linked {
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "No linked account for bank '{}'",
                bank_id
            )))
        }
    }

    fn ordered_ids(&self) -> Result<Vec<i64>> {
        Ok(self.goal_repo.list()?.into_iter().map(|goal| goal.id).collect())
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.list()
    }

    fn get_goal(&self, goal_id: i64) -> Result<Goal> {
        self.goal_repo.get_by_id(goal_id)
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        new_goal.validate()?;
        self.ensure_bank_linked(&new_goal.bank_id)?;

        let goal = self.goal_repo.insert(new_goal).await?;
        info!(
            "Created goal {} '{}' at order {}",
            goal.id, goal.name, goal.order
        );
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: i64, update: GoalUpdate) -> Result<Goal> {
        update.validate()?;
        if let Some(bank_id) = &update.bank_id {
            self.ensure_bank_linked(bank_id)?;
        }
        if update.is_empty() {
            return self.goal_repo.get_by_id(goal_id);
        }
        self.goal_repo.update(goal_id, update).await
    }

    async fn delete_goal(&self, goal_id: i64) -> Result<()> {
        let goal = self.goal_repo.get_by_id(goal_id)?;
        if goal.current_amount > Decimal::ZERO {
            return Err(Error::Conflict(format!(
                "Goal '{}' still holds {}; withdraw the funds before deleting it",
                goal.name, goal.current_amount
            )));
        }

        self.goal_repo.delete(goal_id).await?;
        info!("Deleted goal {} '{}' (order {})", goal.id, goal.name, goal.order);
        Ok(())
    }

    async fn move_goal(&self, goal_id: i64, direction: MoveDirection) -> Result<Vec<Goal>> {
        let current = self.goal_repo.list()?;
        let ids: Vec<i64> = current.iter().map(|goal| goal.id).collect();

        match moved_ordering(&ids, goal_id, direction)? {
            Some(reordered) => {
                debug!("Moving goal {} {:?}", goal_id, direction);
                self.goal_repo.apply_ordering(reordered).await
            }
            None => {
                debug!(
                    "Goal {} is already at the edge, ignoring move {:?}",
                    goal_id, direction
                );
                Ok(current)
            }
        }
    }

    async fn reorder_goals(&self, ordered_ids: Vec<i64>) -> Result<()> {
        // Fail fast here; the store validates again inside its write.
        validate_permutation(&self.ordered_ids()?, &ordered_ids)?;
        self.goal_repo.apply_ordering(ordered_ids).await?;
        Ok(())
    }

    fn get_goal_deposits(&self, goal_id: i64) -> Result<Vec<Deposit>> {
        self.goal_repo.get_by_id(goal_id)?;
        self.goal_repo.list_deposits(goal_id)
    }

    fn get_goal_progress(&self, goal_id: i64) -> Result<GoalProgress> {
        Ok(self.goal_repo.get_by_id(goal_id)?.progress())
    }
}
