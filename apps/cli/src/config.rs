use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use etfwatch_core::ingestion::{IngestionConfig, RetryPolicy};

pub struct Config {
    pub db_path: String,
    pub ingestion: IngestionConfig,
    pub result_path: Option<PathBuf>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = IngestionConfig::default();

        let db_path = lookup("ETFWATCH_DB_PATH").unwrap_or_else(|| "./db/etfwatch.db".into());

        let history_start = match lookup("ETFWATCH_HISTORY_START") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid ETFWATCH_HISTORY_START '{}'", raw))?,
            None => defaults.history_start,
        };

        let settlement_currency = lookup("ETFWATCH_SETTLEMENT_CURRENCY")
            .map(|raw| raw.trim().to_uppercase())
            .unwrap_or(defaults.settlement_currency);

        let max_attempts: u32 = parse_var(&lookup, "ETFWATCH_MAX_ATTEMPTS")?
            .unwrap_or(defaults.retry.max_attempts);
        let retry = match parse_var::<u64>(&lookup, "ETFWATCH_RETRY_DELAY_SECS")? {
            Some(secs) => RetryPolicy::fixed(max_attempts, Duration::from_secs(secs)),
            None => RetryPolicy {
                max_attempts,
                ..defaults.retry
            },
        };

        let ingestion = IngestionConfig {
            history_start,
            settlement_currency,
            trailing_window_days: defaults.trailing_window_days,
            retry,
            quality: defaults.quality,
        };
        ingestion.validate()?;

        let result_path = lookup("ETFWATCH_RESULT_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let log_format = lookup("ETFWATCH_LOG_FORMAT").unwrap_or_else(|| "text".into());

        Ok(Self {
            db_path,
            ingestion,
            result_path,
            log_format,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Invalid {} '{}': {}", key, raw, e))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, "./db/etfwatch.db");
        assert_eq!(config.ingestion, IngestionConfig::default());
        assert!(config.result_path.is_none());
        assert_eq!(config.log_format, "text");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ETFWATCH_DB_PATH", "/tmp/prices.db"),
            ("ETFWATCH_HISTORY_START", "2023-01-02"),
            ("ETFWATCH_SETTLEMENT_CURRENCY", "usd"),
            ("ETFWATCH_MAX_ATTEMPTS", "5"),
            ("ETFWATCH_RETRY_DELAY_SECS", "2"),
            ("ETFWATCH_RESULT_PATH", "/tmp/result.json"),
            ("ETFWATCH_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.db_path, "/tmp/prices.db");
        assert_eq!(
            config.ingestion.history_start,
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
        );
        assert_eq!(config.ingestion.settlement_currency, "USD");
        assert_eq!(
            config.ingestion.retry,
            RetryPolicy::fixed(5, Duration::from_secs(2))
        );
        assert_eq!(config.result_path, Some(PathBuf::from("/tmp/result.json")));
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("ETFWATCH_HISTORY_START", "yesterday")]).is_err());
        assert!(config_from(&[("ETFWATCH_MAX_ATTEMPTS", "three")]).is_err());
        assert!(config_from(&[("ETFWATCH_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("ETFWATCH_SETTLEMENT_CURRENCY", "EURO")]).is_err());
    }
}
