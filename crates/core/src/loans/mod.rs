//! Loans module - domain models, services, and traits.

mod loans_model;
mod loans_service;
mod loans_traits;

pub use loans_model::{Loan, LoanUpdate, NewLoan, NewPayment, Payment};
pub use loans_service::LoanService;
pub use loans_traits::{LoanRepositoryTrait, LoanServiceTrait};
