use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::app_settings::dsl::*;
use autosave_core::errors::{Error, Result};
use autosave_core::settings::{is_known_key, Settings, SettingsRepositoryTrait, SettingsUpdate};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<Settings> {
        let mut conn = get_connection(&self.pool)?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .into_core()?;

        Settings::from_pairs(all_settings)
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        let pairs = new_settings.into_pairs();
        self.writer
            .exec(move |conn| {
                for (key, value) in pairs {
                    diesel::replace_into(app_settings)
                        .values(&AppSettingDB {
                            setting_key: key.to_string(),
                            setting_value: value,
                        })
                        .execute(conn)
                        .into_core()?;
                }
                Ok(())
            })
            .await
    }

    fn get_setting(&self, setting_key_param: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;
        app_settings
            .filter(setting_key.eq(setting_key_param))
            .select(setting_value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Setting '{}' not found", setting_key_param)))
    }

    async fn update_setting(
        &self,
        setting_key_param: &str,
        setting_value_param: &str,
    ) -> Result<()> {
        if !is_known_key(setting_key_param) {
            return Err(Error::InvalidConfigValue(format!(
                "Unknown setting '{}'",
                setting_key_param
            )));
        }
        let row = AppSettingDB {
            setting_key: setting_key_param.to_string(),
            setting_value: setting_value_param.to_string(),
        };

        self.writer
            .exec(move |conn| {
                diesel::replace_into(app_settings)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
