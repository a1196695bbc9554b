use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::retry::RetryPolicy;
use crate::constants::{DEFAULT_HISTORY_START, SETTLEMENT_CURRENCY, TRAILING_WINDOW_DAYS};
use crate::errors::{Error, Result};
use crate::quality::QualityGateConfig;

/// Tunables for one ingestion engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestionConfig {
    /// First date fetched for instruments without stored bars.
    pub history_start: NaiveDate,
    pub settlement_currency: String,
    pub trailing_window_days: i64,
    pub retry: RetryPolicy,
    pub quality: QualityGateConfig,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            history_start: NaiveDate::parse_from_str(DEFAULT_HISTORY_START, "%Y-%m-%d")
                .unwrap_or_default(),
            settlement_currency: SETTLEMENT_CURRENCY.to_string(),
            trailing_window_days: TRAILING_WINDOW_DAYS,
            retry: RetryPolicy::default(),
            quality: QualityGateConfig::default(),
        }
    }
}

impl IngestionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::InvalidConfigValue(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.trailing_window_days <= 0 {
            return Err(Error::InvalidConfigValue(format!(
                "trailing_window_days must be positive, got {}",
                self.trailing_window_days
            )));
        }
        let currency = &self.settlement_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::InvalidConfigValue(format!(
                "settlement_currency must be a 3-letter ISO code, got '{}'",
                currency
            )));
        }
        if self.quality.max_daily_move <= Decimal::ZERO {
            return Err(Error::InvalidConfigValue(format!(
                "max_daily_move must be positive, got {}",
                self.quality.max_daily_move
            )));
        }
        let ratio = self.quality.max_zero_volume_ratio;
        if ratio < Decimal::ZERO || ratio > Decimal::ONE {
            return Err(Error::InvalidConfigValue(format!(
                "max_zero_volume_ratio must be within 0..=1, got {}",
                ratio
            )));
        }
        Ok(())
    }
}
