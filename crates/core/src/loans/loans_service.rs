use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::loans_model::{Loan, LoanUpdate, NewLoan};
use super::loans_traits::{LoanRepositoryTrait, LoanServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result};

/// Service for managing loans.
pub struct LoanService {
    loan_repo: Arc<dyn LoanRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
}

impl LoanService {
    pub fn new(
        loan_repo: Arc<dyn LoanRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            loan_repo,
            account_repo,
        }
    }

    fn ensure_bank_linked(&self, bank_id: &str) -> Result<()> {
        if self
            .account_repo
            .list()?
            .iter()
            .any(|account| account.bank_id == bank_id)
        {
            return Ok(());
        }
        Err(Error::NotFound(format!(
            "No linked account for bank '{}'",
            bank_id
        )))
    }
}

#[async_trait]
impl LoanServiceTrait for LoanService {
    fn get_loans(&self) -> Result<Vec<Loan>> {
        self.loan_repo.list()
    }

    fn get_loan(&self, loan_id: i64) -> Result<Loan> {
        self.loan_repo.get_by_id(loan_id)
    }

    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        new_loan.validate()?;
        self.ensure_bank_linked(&new_loan.bank_id)?;
        let loan = self.loan_repo.insert(new_loan).await?;
        info!("Created loan {} '{}'", loan.id, loan.name);
        Ok(loan)
    }

    async fn update_loan(&self, loan_id: i64, update: LoanUpdate) -> Result<Loan> {
        update.validate()?;
        if let Some(bank_id) = &update.bank_id {
            self.ensure_bank_linked(bank_id)?;
        }
        self.loan_repo.update(loan_id, update).await
    }

    async fn delete_loan(&self, loan_id: i64) -> Result<()> {
        let deleted = self.loan_repo.delete(loan_id).await?;
        if deleted == 0 {
            return Err(Error::not_found("Loan", loan_id));
        }
        info!("Deleted loan {}", loan_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::NewAccount;
    use crate::memory::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn setup() -> (InMemoryStore, LoanService) {
        let store = InMemoryStore::new();
        store
            .accounts()
            .create(NewAccount {
                bank_id: "sbank".to_string(),
                number: "40817-9".to_string(),
                opening_balance: Decimal::ZERO,
            })
            .await
            .unwrap();
        let service = LoanService::new(store.loans(), store.accounts());
        (store, service)
    }

    fn new_loan(bank: &str) -> NewLoan {
        NewLoan {
            name: "Car loan".to_string(),
            debt: dec!(300000),
            rate: dec!(12),
            monthly_payment: dec!(15000),
            next_payment: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
            bank_id: bank.to_string(),
            auto_payment: false,
        }
    }

    #[tokio::test]
    async fn created_loan_has_empty_history() {
        let (_store, service) = setup().await;
        let loan = service.create_loan(new_loan("sbank")).await.unwrap();
        assert!(loan.payment_history.is_empty());
        assert_eq!(service.get_loans().unwrap(), vec![loan]);
    }

    #[tokio::test]
    async fn loan_at_unlinked_bank_is_rejected() {
        let (_store, service) = setup().await;
        let err = service.create_loan(new_loan("tbank")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (_store, service) = setup().await;
        let loan = service.create_loan(new_loan("sbank")).await.unwrap();

        let updated = service
            .update_loan(
                loan.id,
                LoanUpdate {
                    auto_payment: Some(true),
                    monthly_payment: Some(dec!(20000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.auto_payment);
        assert_eq!(updated.monthly_payment, dec!(20000));
        assert_eq!(updated.debt, loan.debt);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_loan_is_not_found() {
        let (_store, service) = setup().await;
        let err = service
            .update_loan(7, LoanUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = service.delete_loan(7).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_loan() {
        let (_store, service) = setup().await;
        let loan = service.create_loan(new_loan("sbank")).await.unwrap();
        service.delete_loan(loan.id).await.unwrap();
        assert!(service.get_loans().unwrap().is_empty());
    }
}
