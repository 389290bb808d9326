//! SQLite storage implementation for goals and their deposits.

mod model;
mod repository;

pub use model::{DepositDB, GoalDB, NewDepositDB, NewGoalDB};
pub use repository::GoalRepository;
pub(crate) use repository::{apply_balance_change_in, insert_deposit_in};
