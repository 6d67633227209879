// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed view over the `settings` key/value table.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{get_setting, put_setting};
use crate::error::FinanceError;
use crate::models::{DEFAULT_ALERT_THRESHOLD, validate_alert_threshold};

pub const KEYS: [&str; 4] = [
    "currency",
    "alert_threshold",
    "date_format",
    "low_balance_threshold",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Display label for amounts; nothing is converted.
    pub currency: String,
    /// Default alert threshold for new budgets, as a fraction.
    pub alert_threshold: Decimal,
    /// chrono format used when parsing imported dates.
    pub date_format: String,
    pub low_balance_threshold: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            date_format: "%Y-%m-%d".to_string(),
            low_balance_threshold: Decimal::ZERO,
        }
    }
}

impl Settings {
    /// Reads every known key, falling back to the default for absent ones.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut settings = Settings::default();
        for key in KEYS {
            if let Some(value) = get_setting(conn, key)? {
                settings.apply(key, &value)?;
            }
        }
        Ok(settings)
    }

    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match key {
            "currency" => self.currency.clone(),
            "alert_threshold" => self.alert_threshold.to_string(),
            "date_format" => self.date_format.clone(),
            "low_balance_threshold" => self.low_balance_threshold.to_string(),
            other => return Err(unknown_key(other).into()),
        })
    }

    /// Validates `value` for `key` and persists it.
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<Self> {
        let mut settings = Settings::load(conn)?;
        settings.apply(key, value)?;
        put_setting(conn, key, &settings.get(key)?)?;
        tracing::info!(key, value, "setting updated");
        Ok(settings)
    }

    pub fn entries(&self) -> Result<Vec<(&'static str, String)>> {
        KEYS.iter().map(|k| Ok((*k, self.get(k)?))).collect()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), FinanceError> {
        match key {
            "currency" => {
                let ccy = value.trim().to_uppercase();
                if ccy.is_empty() {
                    return Err(FinanceError::Validation("currency must not be empty".into()));
                }
                self.currency = ccy;
            }
            "alert_threshold" => {
                let t = parse_setting_decimal(key, value)?;
                validate_alert_threshold(t)?;
                self.alert_threshold = t;
            }
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(FinanceError::Validation("date_format must not be empty".into()));
                }
                self.date_format = value.to_string();
            }
            "low_balance_threshold" => {
                self.low_balance_threshold = parse_setting_decimal(key, value)?;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn parse_setting_decimal(key: &str, value: &str) -> Result<Decimal, FinanceError> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|_| FinanceError::Validation(format!("{} expects a decimal, got '{}'", key, value)))
}

fn unknown_key(key: &str) -> FinanceError {
    FinanceError::Validation(format!(
        "unknown setting '{}' (known: {})",
        key,
        KEYS.join(", ")
    ))
}
