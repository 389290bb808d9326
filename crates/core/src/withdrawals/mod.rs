//! Withdrawals module - planning and confirming emergency withdrawals.

mod withdrawals_model;
mod withdrawals_service;
mod withdrawals_traits;

pub use withdrawals_model::{EmergencyWithdrawPlan, WithdrawalOutcome};
pub use withdrawals_service::{deposits_to_close, EmergencyWithdrawalService};
pub use withdrawals_traits::EmergencyWithdrawalServiceTrait;
