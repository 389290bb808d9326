use async_trait::async_trait;

use super::operations_model::{NewOperation, Operation};
use crate::errors::Result;

/// Trait defining the contract for the operation log store.
///
/// The log is append-only. Ids are assigned monotonically by the store and
/// never reused, even after a failed write.
#[async_trait]
pub trait OperationRepositoryTrait: Send + Sync {
    /// Lists all operations, newest first.
    fn list(&self) -> Result<Vec<Operation>>;

    /// Appends a single operation outside of a ledger commit.
    ///
    /// Used for audit entries that do not move money, such as a failed
    /// withdrawal confirmation.
    async fn append(&self, new_operation: NewOperation) -> Result<Operation>;
}

/// Trait defining the contract for operation log queries.
pub trait OperationServiceTrait: Send + Sync {
    /// Lists every operation, newest first.
    fn list_operations(&self) -> Result<Vec<Operation>>;

    /// Lists operations recorded against the goal with this display name.
    fn list_goal_operations(&self, goal_name: &str) -> Result<Vec<Operation>>;

    /// Lists operations recorded against the loan with this display name.
    fn list_loan_operations(&self, loan_name: &str) -> Result<Vec<Operation>>;
}
