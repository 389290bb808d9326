#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountRepositoryTrait, NewAccount};
    use crate::errors::Error;
    use crate::goals::{GoalRepositoryTrait, NewGoal};
    use crate::loans::{LoanRepositoryTrait, NewLoan};
    use crate::memory::InMemoryStore;
    use crate::operations::{MovementStatus, OperationRepositoryTrait, OperationType};
    use crate::transfers::{TransferService, TransferServiceTrait};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn service(store: &InMemoryStore) -> TransferService {
        TransferService::new(store.goals(), store.loans(), store.accounts(), store.ledger())
    }

    async fn account(store: &InMemoryStore, bank: &str, balance: Decimal) -> Account {
        store
            .accounts()
            .create(NewAccount {
                bank_id: bank.to_string(),
                number: format!("{}-main", bank),
                opening_balance: balance,
            })
            .await
            .unwrap()
    }

    async fn goal(store: &InMemoryStore, name: &str, target: Decimal, monthly: Decimal) -> i64 {
        store
            .goals()
            .insert(NewGoal {
                name: name.to_string(),
                target_amount: target,
                monthly_amount: monthly,
                next_deposit: date(5, 10),
                bank_id: "vbank".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn total_funds(store: &InMemoryStore) -> Decimal {
        let snapshot = store.snapshot();
        let accounts: Decimal = snapshot.accounts.values().map(|a| a.balance).sum();
        let goals: Decimal = snapshot.goals.values().map(|g| g.current_amount).sum();
        accounts + goals
    }

    #[tokio::test]
    async fn deposit_moves_money_from_account_to_goal() {
        let store = InMemoryStore::new();
        let account = account(&store, "vbank", dec!(10000)).await;
        let goal_id = goal(&store, "Car", dec!(50000), dec!(5000)).await;
        let before = total_funds(&store);

        let deposit = service(&store)
            .deposit_to_goal(goal_id, dec!(4000))
            .await
            .unwrap();

        assert_eq!(deposit.status, MovementStatus::Completed);
        assert_eq!(
            store.goals().get_by_id(goal_id).unwrap().current_amount,
            dec!(4000)
        );
        assert_eq!(
            store.accounts().get_by_id(account.id).unwrap().balance,
            dec!(6000)
        );
        assert_eq!(total_funds(&store), before);

        let ops = store.operations().list().unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation_type, OperationType::Deposit);
        assert_eq!(ops[0].goal.as_deref(), Some("Car"));
    }

    #[tokio::test]
    async fn deposit_without_enough_money_is_recorded_as_failed() {
        let store = InMemoryStore::new();
        let account = account(&store, "vbank", dec!(100)).await;
        let goal_id = goal(&store, "Car", dec!(50000), dec!(5000)).await;

        let err = service(&store)
            .deposit_to_goal(goal_id, dec!(500))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));

        assert_eq!(
            store.goals().get_by_id(goal_id).unwrap().current_amount,
            Decimal::ZERO
        );
        assert_eq!(
            store.accounts().get_by_id(account.id).unwrap().balance,
            dec!(100)
        );

        let deposits = store.goals().list_deposits(goal_id).unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].status, MovementStatus::Failed);

        let ops = store.operations().list().unwrap();
        assert_eq!(ops[0].status, MovementStatus::Failed);
        assert!(ops[0].error.is_some());
    }

    #[tokio::test]
    async fn non_positive_deposit_is_rejected_without_records() {
        let store = InMemoryStore::new();
        account(&store, "vbank", dec!(100)).await;
        let goal_id = goal(&store, "Car", dec!(50000), dec!(5000)).await;
        let before = store.snapshot();

        let err = service(&store)
            .deposit_to_goal(goal_id, dec!(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn scheduled_run_funds_due_goals_in_priority_order() {
        let store = InMemoryStore::new();
        account(&store, "vbank", dec!(7000)).await;
        let first = goal(&store, "Car", dec!(50000), dec!(5000)).await;
        let second = goal(&store, "Trip", dec!(20000), dec!(3000)).await;

        let deposits = service(&store)
            .run_scheduled_deposits(date(5, 10))
            .await
            .unwrap();

        assert_eq!(deposits.len(), 2);
        assert_eq!(deposits[0].goal_id, first);
        assert_eq!(deposits[0].status, MovementStatus::Completed);
        assert_eq!(deposits[1].goal_id, second);
        assert_eq!(deposits[1].status, MovementStatus::Failed);

        // Both schedules advance, including the goal whose deposit failed.
        assert_eq!(
            store.goals().get_by_id(first).unwrap().next_deposit,
            date(6, 10)
        );
        let trip = store.goals().get_by_id(second).unwrap();
        assert_eq!(trip.next_deposit, date(6, 10));
        assert_eq!(trip.current_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn scheduled_deposit_is_capped_at_remaining_amount() {
        let store = InMemoryStore::new();
        account(&store, "vbank", dec!(100000)).await;
        let goal_id = goal(&store, "Phone", dec!(8000), dec!(5000)).await;
        let service = service(&store);

        service.run_scheduled_deposits(date(5, 10)).await.unwrap();
        let deposits = service.run_scheduled_deposits(date(6, 10)).await.unwrap();
        assert_eq!(deposits[0].amount, dec!(3000));

        let goal = store.goals().get_by_id(goal_id).unwrap();
        assert_eq!(goal.current_amount, dec!(8000));

        // Completed goals are skipped.
        let deposits = service.run_scheduled_deposits(date(7, 10)).await.unwrap();
        assert!(deposits.is_empty());
    }

    #[tokio::test]
    async fn goals_not_yet_due_are_skipped() {
        let store = InMemoryStore::new();
        account(&store, "vbank", dec!(100000)).await;
        goal(&store, "Car", dec!(50000), dec!(5000)).await;
        let before = store.snapshot();

        let deposits = service(&store)
            .run_scheduled_deposits(date(5, 9))
            .await
            .unwrap();
        assert!(deposits.is_empty());
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn loan_payment_is_capped_at_debt() {
        let store = InMemoryStore::new();
        let account = account(&store, "vbank", dec!(10000)).await;
        let loan = store
            .loans()
            .insert(NewLoan {
                name: "Credit card".to_string(),
                debt: dec!(1200),
                rate: dec!(24),
                monthly_payment: dec!(500),
                next_payment: date(5, 1),
                bank_id: "vbank".to_string(),
                auto_payment: false,
            })
            .await
            .unwrap();

        let payment = service(&store).pay_loan(loan.id, dec!(5000)).await.unwrap();
        assert_eq!(payment.amount, dec!(1200));

        let loan = store.loans().get_by_id(loan.id).unwrap();
        assert!(loan.is_paid_off());
        assert_eq!(loan.payment_history.len(), 1);
        assert_eq!(
            store.accounts().get_by_id(account.id).unwrap().balance,
            dec!(8800)
        );

        let err = service(&store).pay_loan(loan.id, dec!(10)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn autopayments_only_touch_due_auto_paid_loans() {
        let store = InMemoryStore::new();
        account(&store, "vbank", dec!(100000)).await;
        let loans = store.loans();
        let auto = loans
            .insert(NewLoan {
                name: "Mortgage".to_string(),
                debt: dec!(900000),
                rate: dec!(8),
                monthly_payment: dec!(20000),
                next_payment: date(5, 15),
                bank_id: "vbank".to_string(),
                auto_payment: true,
            })
            .await
            .unwrap();
        let manual = loans
            .insert(NewLoan {
                name: "Car loan".to_string(),
                debt: dec!(200000),
                rate: dec!(11),
                monthly_payment: dec!(10000),
                next_payment: date(5, 1),
                bank_id: "vbank".to_string(),
                auto_payment: false,
            })
            .await
            .unwrap();

        let payments = service(&store)
            .run_loan_autopayments(date(5, 20))
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].loan_id, auto.id);

        let auto = loans.get_by_id(auto.id).unwrap();
        assert_eq!(auto.debt, dec!(880000));
        assert_eq!(auto.next_payment, date(6, 15));
        assert_eq!(loans.get_by_id(manual.id).unwrap().debt, dec!(200000));

        let ops = store.operations().list().unwrap();
        assert_eq!(ops[0].operation_type, OperationType::LoanPayment);
        assert_eq!(ops[0].loan.as_deref(), Some("Mortgage"));
    }
}
