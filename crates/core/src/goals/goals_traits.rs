use crate::errors::Result;
use crate::goals::goals_model::{
    Deposit, Goal, GoalProgress, GoalUpdate, MoveDirection, NewGoal,
};
use async_trait::async_trait;

/// Trait for goal repository operations.
///
/// Implementations own the ordering invariant: inserts append at
/// `count + 1`, deletes compact the orders above the removed goal, and
/// `apply_ordering` re-validates the permutation inside its write.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    /// Lists all goals sorted by `order` ascending.
    fn list(&self) -> Result<Vec<Goal>>;

    fn get_by_id(&self, goal_id: i64) -> Result<Goal>;

    /// Inserts a goal with a zero balance at the end of the priority list.
    async fn insert(&self, new_goal: NewGoal) -> Result<Goal>;

    /// Applies a partial update and bumps the goal's version.
    async fn update(&self, goal_id: i64, update: GoalUpdate) -> Result<Goal>;

    /// Deletes a goal with its deposit history and compacts the remaining
    /// orders. Returns the number of deleted goals.
    async fn delete(&self, goal_id: i64) -> Result<usize>;

    /// Rewrites every goal's order to its index in `ordered_ids` plus one.
    async fn apply_ordering(&self, ordered_ids: Vec<i64>) -> Result<Vec<Goal>>;

    /// Lists a goal's deposits, newest first.
    fn list_deposits(&self, goal_id: i64) -> Result<Vec<Deposit>>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    /// Lists goals sorted by priority.
    fn get_goals(&self) -> Result<Vec<Goal>>;

    fn get_goal(&self, goal_id: i64) -> Result<Goal>;

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;

    async fn update_goal(&self, goal_id: i64, update: GoalUpdate) -> Result<Goal>;

    /// Deletes a goal with its deposits and compacts the orders behind it.
    /// A goal that still holds money is refused with `Conflict`; withdraw
    /// its balance first.
    async fn delete_goal(&self, goal_id: i64) -> Result<()>;

    /// Swaps a goal with its neighbour. Moving past either end is a no-op
    /// and returns the unchanged list.
    async fn move_goal(&self, goal_id: i64, direction: MoveDirection) -> Result<Vec<Goal>>;

    /// Replaces the whole priority list.
    async fn reorder_goals(&self, ordered_ids: Vec<i64>) -> Result<()>;

    fn get_goal_deposits(&self, goal_id: i64) -> Result<Vec<Deposit>>;

    fn get_goal_progress(&self, goal_id: i64) -> Result<GoalProgress>;
}
