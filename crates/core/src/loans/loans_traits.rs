use crate::errors::Result;
use crate::loans::loans_model::{Loan, LoanUpdate, NewLoan, Payment};
use async_trait::async_trait;

/// Trait for loan repository operations.
///
/// Loans are returned with their payment history loaded, newest first.
#[async_trait]
pub trait LoanRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<Loan>>;

    fn get_by_id(&self, loan_id: i64) -> Result<Loan>;

    async fn insert(&self, new_loan: NewLoan) -> Result<Loan>;

    async fn update(&self, loan_id: i64, update: LoanUpdate) -> Result<Loan>;

    /// Deletes a loan together with its payments.
    async fn delete(&self, loan_id: i64) -> Result<usize>;

    fn list_payments(&self, loan_id: i64) -> Result<Vec<Payment>>;
}

/// Trait for loan service operations
#[async_trait]
pub trait LoanServiceTrait: Send + Sync {
    fn get_loans(&self) -> Result<Vec<Loan>>;

    fn get_loan(&self, loan_id: i64) -> Result<Loan>;

    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan>;

    async fn update_loan(&self, loan_id: i64, update: LoanUpdate) -> Result<Loan>;

    async fn delete_loan(&self, loan_id: i64) -> Result<()>;
}
