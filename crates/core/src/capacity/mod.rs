//! Capacity module - how much the account holder can save each month.

mod capacity_model;
mod capacity_service;
mod capacity_traits;

pub use capacity_model::{estimate_savings_capacity, FinancialProfile};
pub use capacity_service::CapacityService;
pub use capacity_traits::CapacityServiceTrait;
