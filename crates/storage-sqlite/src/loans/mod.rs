//! SQLite storage implementation for loans and their payments.

mod model;
mod repository;

pub use model::{LoanDB, NewLoanDB, NewPaymentDB, PaymentDB};
pub use repository::LoanRepository;
pub(crate) use repository::{apply_debt_change_in, insert_payment_in, load_loan};
