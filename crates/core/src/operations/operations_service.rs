use std::sync::Arc;

use super::operations_model::{sort_for_display, Operation};
use super::operations_traits::{OperationRepositoryTrait, OperationServiceTrait};
use crate::errors::Result;

/// Read side of the operation log.
pub struct OperationService {
    repository: Arc<dyn OperationRepositoryTrait>,
}

impl OperationService {
    pub fn new(repository: Arc<dyn OperationRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn filtered<F>(&self, predicate: F) -> Result<Vec<Operation>>
    where
        F: Fn(&Operation) -> bool,
    {
        let mut operations: Vec<Operation> = self
            .repository
            .list()?
            .into_iter()
            .filter(|op| predicate(op))
            .collect();
        sort_for_display(&mut operations);
        Ok(operations)
    }
}

impl OperationServiceTrait for OperationService {
    fn list_operations(&self) -> Result<Vec<Operation>> {
        self.filtered(|_| true)
    }

    fn list_goal_operations(&self, goal_name: &str) -> Result<Vec<Operation>> {
        self.filtered(|op| op.goal.as_deref() == Some(goal_name))
    }

    fn list_loan_operations(&self, loan_name: &str) -> Result<Vec<Operation>> {
        self.filtered(|op| op.loan.as_deref() == Some(loan_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::operations::{MovementStatus, NewOperation, OperationType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn operations_are_listed_newest_first() {
        let store = InMemoryStore::new();
        let repo = store.operations();
        let service = OperationService::new(repo.clone());

        repo
            .append(NewOperation::completed(at(1), OperationType::Deposit, dec!(100)).for_goal("Car"))
            .await
            .unwrap();
        repo
            .append(NewOperation::completed(at(3), OperationType::LoanPayment, dec!(50)).for_loan("Mortgage"))
            .await
            .unwrap();
        repo
            .append(NewOperation::failed(at(2), OperationType::Deposit, dec!(100), "no money").for_goal("Car"))
            .await
            .unwrap();

        let ops = service.list_operations().unwrap();
        let dates: Vec<_> = ops.iter().map(|op| op.date).collect();
        assert_eq!(dates, vec![at(3), at(2), at(1)]);
        assert_eq!(ops[1].status, MovementStatus::Failed);
        assert_eq!(ops[1].error.as_deref(), Some("no money"));
    }

    #[tokio::test]
    async fn same_date_operations_fall_back_to_id_order() {
        let store = InMemoryStore::new();
        let repo = store.operations();
        let service = OperationService::new(repo.clone());

        let first = repo
            .append(NewOperation::completed(at(4), OperationType::Deposit, dec!(1)))
            .await
            .unwrap();
        let second = repo
            .append(NewOperation::completed(at(4), OperationType::Deposit, dec!(2)))
            .await
            .unwrap();
        assert!(second.id > first.id);

        let ops = service.list_operations().unwrap();
        assert_eq!(ops[0].id, second.id);
        assert_eq!(ops[1].id, first.id);
    }

    #[tokio::test]
    async fn goal_and_loan_filters_match_display_names() {
        let store = InMemoryStore::new();
        let repo = store.operations();
        let service = OperationService::new(repo.clone());

        repo
            .append(NewOperation::completed(at(1), OperationType::Deposit, dec!(10)).for_goal("Car"))
            .await
            .unwrap();
        repo
            .append(NewOperation::completed(at(2), OperationType::Deposit, dec!(20)).for_goal("House"))
            .await
            .unwrap();
        repo
            .append(NewOperation::completed(at(3), OperationType::LoanPayment, dec!(30)).for_loan("Car loan"))
            .await
            .unwrap();

        let car = service.list_goal_operations("Car").unwrap();
        assert_eq!(car.len(), 1);
        assert_eq!(car[0].amount, dec!(10));

        let loans = service.list_loan_operations("Car loan").unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].operation_type, OperationType::LoanPayment);
    }
}
