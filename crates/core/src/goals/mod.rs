//! Goals module - domain models, ordering rules, services, and traits.

mod goals_model;
pub mod goals_ordering;
mod goals_service;
mod goals_traits;

pub use goals_model::{
    Deposit, Goal, GoalProgress, GoalStatus, GoalUpdate, MoveDirection, NewDeposit, NewGoal,
};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
