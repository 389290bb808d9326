use super::SettingsRepositoryTrait;
use crate::accounts::AccountRepositoryTrait;
use crate::constants::setting_keys;
use crate::errors::{Error, Result};
use crate::goals::GoalRepositoryTrait;
use crate::settings::{Settings, SettingsUpdate};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

// Define the trait for SettingsService
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()>;

    /// The account credited by emergency withdrawals.
    fn home_account_id(&self) -> Result<i64>;

    /// The goal emergency withdrawals are taken from.
    fn withdrawal_source_goal_id(&self) -> Result<i64>;

    /// Get a single setting value by key. Returns None if not found.
    fn get_setting_value(&self, key: &str) -> Result<Option<String>>;

    /// Set a single setting value by key.
    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    goal_repository: Arc<dyn GoalRepositoryTrait>,
}

impl SettingsService {
    pub fn new(
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        goal_repository: Arc<dyn GoalRepositoryTrait>,
    ) -> Self {
        SettingsService {
            settings_repository,
            account_repository,
            goal_repository,
        }
    }

    /// Referenced ids must exist at the time they are configured.
    fn ensure_references(&self, update: &SettingsUpdate) -> Result<()> {
        if let Some(account_id) = update.home_account_id {
            self.account_repository.get_by_id(account_id)?;
        }
        if let Some(goal_id) = update.withdrawal_source_goal_id {
            self.goal_repository.get_by_id(goal_id)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        self.settings_repository.get_settings()
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        new_settings.validate()?;
        self.ensure_references(new_settings)?;

        debug!("Updating settings: {:?}", new_settings);
        self.settings_repository
            .update_settings(new_settings)
            .await?;
        Ok(())
    }

    fn home_account_id(&self) -> Result<i64> {
        self.get_settings()?
            .home_account_id
            .ok_or_else(|| Error::MissingConfigKey(setting_keys::HOME_ACCOUNT_ID.to_string()))
    }

    fn withdrawal_source_goal_id(&self) -> Result<i64> {
        self.get_settings()?.withdrawal_source_goal_id.ok_or_else(|| {
            Error::MissingConfigKey(setting_keys::WITHDRAWAL_SOURCE_GOAL_ID.to_string())
        })
    }

    fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_setting_value(&self, key: &str, value: &str) -> Result<()> {
        // Parse against the current settings so typed reads never fail later.
        let mut settings = self.get_settings()?;
        settings.apply_pair(key, value)?;

        let update = SettingsUpdate {
            home_account_id: settings
                .home_account_id
                .filter(|_| key == setting_keys::HOME_ACCOUNT_ID),
            withdrawal_source_goal_id: settings
                .withdrawal_source_goal_id
                .filter(|_| key == setting_keys::WITHDRAWAL_SOURCE_GOAL_ID),
            ..Default::default()
        };
        self.ensure_references(&update)?;

        self.settings_repository
            .update_setting(key, value.trim())
            .await?;
        info!("Setting '{}' updated", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::NewAccount;
    use crate::memory::InMemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn service(store: &InMemoryStore) -> SettingsService {
        SettingsService::new(store.settings(), store.accounts(), store.goals())
    }

    #[tokio::test]
    async fn unset_ids_are_missing_config_keys() {
        let store = InMemoryStore::new();
        let service = service(&store);

        assert!(matches!(
            service.home_account_id().unwrap_err(),
            Error::MissingConfigKey(_)
        ));
        assert!(matches!(
            service.withdrawal_source_goal_id().unwrap_err(),
            Error::MissingConfigKey(_)
        ));
        assert_eq!(service.get_setting_value("home_account_id").unwrap(), None);
    }

    #[tokio::test]
    async fn update_requires_existing_references() {
        let store = InMemoryStore::new();
        let service = service(&store);

        let err = service
            .update_settings(&SettingsUpdate {
                home_account_id: Some(12),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let account = store
            .accounts()
            .create(NewAccount {
                bank_id: "vbank".to_string(),
                number: "1".to_string(),
                opening_balance: Decimal::ZERO,
            })
            .await
            .unwrap();
        service
            .update_settings(&SettingsUpdate {
                home_account_id: Some(account.id),
                withdrawal_penalty_rate: Some(dec!(0.02)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(service.home_account_id().unwrap(), account.id);
        assert_eq!(
            service.get_settings().unwrap().withdrawal_penalty_rate,
            dec!(0.02)
        );
    }

    #[tokio::test]
    async fn single_values_are_parsed_before_storing() {
        let store = InMemoryStore::new();
        let service = service(&store);

        let err = service
            .set_setting_value("withdrawal_delay_months", "soon")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
        assert_eq!(
            service.get_setting_value("withdrawal_delay_months").unwrap(),
            None
        );

        service
            .set_setting_value("withdrawal_delay_months", "3")
            .await
            .unwrap();
        assert_eq!(service.get_settings().unwrap().withdrawal_delay_months, 3);
    }
}
