//! Trailing-window metric models.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive date range the trailing metrics are computed over.
///
/// `end` doubles as the calculation date of the resulting metrics row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MetricsWindow {
    /// Window of `days` calendar days ending on `end`.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Price levels at fixed percentage drops from the trailing high.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecreaseThresholds {
    pub pct_10: Decimal,
    pub pct_15: Decimal,
    pub pct_20: Decimal,
    pub pct_25: Decimal,
    pub pct_30: Decimal,
}

impl DecreaseThresholds {
    /// `high * (1 - p/100)` for each threshold percentage.
    pub fn from_high(high: Decimal) -> Self {
        Self {
            pct_10: threshold_price(high, 10),
            pct_15: threshold_price(high, 15),
            pct_20: threshold_price(high, 20),
            pct_25: threshold_price(high, 25),
            pct_30: threshold_price(high, 30),
        }
    }
}

pub fn threshold_price(high: Decimal, pct: u32) -> Decimal {
    high * Decimal::from(100 - pct.min(100)) / Decimal::ONE_HUNDRED
}

/// Trailing high/low for one instrument as of a calculation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingMetrics {
    pub instrument_id: String,
    pub calculation_date: NaiveDate,
    pub window_start: NaiveDate,
    pub high: Decimal,
    pub high_date: NaiveDate,
    pub low: Decimal,
    pub low_date: NaiveDate,
    pub thresholds: DecreaseThresholds,
}
