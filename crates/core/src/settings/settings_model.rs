use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::{
    setting_keys, DEFAULT_PLAN_TTL_SECS, DEFAULT_WITHDRAWAL_DELAY_MONTHS,
    DEFAULT_WITHDRAWAL_PENALTY_RATE,
};
use crate::errors::{Error, Result};

/// Typed view over the key/value settings rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Account credited by emergency withdrawals.
    pub home_account_id: Option<i64>,
    /// Goal emergency withdrawals are taken from.
    pub withdrawal_source_goal_id: Option<i64>,
    pub withdrawal_penalty_rate: Decimal,
    pub withdrawal_delay_months: u32,
    pub plan_ttl_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_account_id: None,
            withdrawal_source_goal_id: None,
            withdrawal_penalty_rate: Decimal::from_str(DEFAULT_WITHDRAWAL_PENALTY_RATE)
                .unwrap_or_default(),
            withdrawal_delay_months: DEFAULT_WITHDRAWAL_DELAY_MONTHS,
            plan_ttl_secs: DEFAULT_PLAN_TTL_SECS,
        }
    }
}

impl Settings {
    /// Builds settings from stored rows. Keys that are absent keep their
    /// defaults; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Settings::default();
        for (key, value) in pairs {
            if is_known_key(key.as_ref()) {
                settings.apply_pair(key.as_ref(), value.as_ref())?;
            }
        }
        Ok(settings)
    }

    /// Parses `value` and stores it under `key`.
    pub fn apply_pair(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            setting_keys::HOME_ACCOUNT_ID => {
                self.home_account_id = parse_optional_id(key, value)?;
            }
            setting_keys::WITHDRAWAL_SOURCE_GOAL_ID => {
                self.withdrawal_source_goal_id = parse_optional_id(key, value)?;
            }
            setting_keys::WITHDRAWAL_PENALTY_RATE => {
                let rate = Decimal::from_str(value).map_err(|_| invalid(key, value))?;
                validate_penalty_rate(rate)?;
                self.withdrawal_penalty_rate = rate;
            }
            setting_keys::WITHDRAWAL_DELAY_MONTHS => {
                self.withdrawal_delay_months = value.parse().map_err(|_| invalid(key, value))?;
            }
            setting_keys::PLAN_TTL_SECS => {
                let ttl: i64 = value.parse().map_err(|_| invalid(key, value))?;
                validate_ttl(ttl)?;
                self.plan_ttl_secs = ttl;
            }
            _ => {
                return Err(Error::InvalidConfigValue(format!(
                    "Unknown setting '{}'",
                    key
                )))
            }
        }
        Ok(())
    }
}

/// Partial settings update. `None` fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub home_account_id: Option<i64>,
    pub withdrawal_source_goal_id: Option<i64>,
    pub withdrawal_penalty_rate: Option<Decimal>,
    pub withdrawal_delay_months: Option<u32>,
    pub plan_ttl_secs: Option<i64>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.withdrawal_penalty_rate {
            validate_penalty_rate(rate)?;
        }
        if let Some(ttl) = self.plan_ttl_secs {
            validate_ttl(ttl)?;
        }
        Ok(())
    }

    /// Rows to upsert, keyed by setting name.
    pub fn into_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.home_account_id {
            pairs.push((setting_keys::HOME_ACCOUNT_ID, id.to_string()));
        }
        if let Some(id) = self.withdrawal_source_goal_id {
            pairs.push((setting_keys::WITHDRAWAL_SOURCE_GOAL_ID, id.to_string()));
        }
        if let Some(rate) = self.withdrawal_penalty_rate {
            pairs.push((setting_keys::WITHDRAWAL_PENALTY_RATE, rate.to_string()));
        }
        if let Some(months) = self.withdrawal_delay_months {
            pairs.push((setting_keys::WITHDRAWAL_DELAY_MONTHS, months.to_string()));
        }
        if let Some(ttl) = self.plan_ttl_secs {
            pairs.push((setting_keys::PLAN_TTL_SECS, ttl.to_string()));
        }
        pairs
    }
}

pub fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        setting_keys::HOME_ACCOUNT_ID
            | setting_keys::WITHDRAWAL_SOURCE_GOAL_ID
            | setting_keys::WITHDRAWAL_PENALTY_RATE
            | setting_keys::WITHDRAWAL_DELAY_MONTHS
            | setting_keys::PLAN_TTL_SECS
    )
}

fn parse_optional_id(key: &str, value: &str) -> Result<Option<i64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid(key, value))
}

fn validate_penalty_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(Error::InvalidConfigValue(format!(
            "Penalty rate must be in [0, 1), got {}",
            rate
        )));
    }
    Ok(())
}

fn validate_ttl(ttl: i64) -> Result<()> {
    if ttl <= 0 {
        return Err(Error::InvalidConfigValue(format!(
            "Plan lifetime must be positive, got {}",
            ttl
        )));
    }
    Ok(())
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfigValue(format!("'{}' is not a valid value for {}", value, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_apply_when_rows_are_missing() {
        let settings = Settings::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.withdrawal_penalty_rate, dec!(0.015));
        assert_eq!(settings.withdrawal_delay_months, 2);
        assert_eq!(settings.plan_ttl_secs, 900);
    }

    #[test]
    fn rows_override_defaults_and_unknown_keys_are_ignored() {
        let settings = Settings::from_pairs(vec![
            ("home_account_id", "4"),
            ("withdrawal_source_goal_id", "7"),
            ("withdrawal_penalty_rate", "0.02"),
            ("theme", "dark"),
        ])
        .unwrap();
        assert_eq!(settings.home_account_id, Some(4));
        assert_eq!(settings.withdrawal_source_goal_id, Some(7));
        assert_eq!(settings.withdrawal_penalty_rate, dec!(0.02));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = Settings::from_pairs(vec![("withdrawal_delay_months", "two")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));

        let err = Settings::from_pairs(vec![("withdrawal_penalty_rate", "1.5")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }

    #[test]
    fn update_pairs_only_cover_supplied_fields() {
        let update = SettingsUpdate {
            home_account_id: Some(3),
            plan_ttl_secs: Some(60),
            ..Default::default()
        };
        assert_eq!(
            update.into_pairs(),
            vec![
                ("home_account_id", "3".to_string()),
                ("plan_ttl_secs", "60".to_string())
            ]
        );
    }
}
