//! Daily bar domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::SETTLEMENT_DECIMAL_PRECISION;
use crate::metrics::TrailingMetrics;
use etfwatch_market_data::ProviderBar;

/// One stored trading day for an instrument, keyed by `(instrument_id, date)`.
///
/// Source-currency prices come straight from the quote provider. Settlement
/// prices are either absent as a whole (`settlement == None`) or present as a
/// whole, so a bar is never half normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBar {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<i64>,
    pub settlement: Option<SettlementPrices>,
}

impl DailyBar {
    /// Builds an un-normalized bar from a provider bar.
    pub fn from_provider(instrument_id: &str, bar: ProviderBar) -> Self {
        Self {
            instrument_id: instrument_id.to_string(),
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            settlement: None,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.settlement.is_some()
    }

    /// Marks the bar as quoted in the settlement currency already.
    pub fn with_identity_settlement(mut self) -> Self {
        self.settlement = Some(SettlementPrices::identity(&self));
        self
    }
}

/// Settlement-currency equivalents of a bar's four prices.
///
/// Each field mirrors the nullness of its source field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPrices {
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
}

impl SettlementPrices {
    /// Source already in the settlement currency: copy the values untouched.
    pub fn identity(bar: &DailyBar) -> Self {
        Self {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }

    /// Multiply each present price by `rate` and round to currency precision.
    pub fn converted(bar: &DailyBar, rate: Decimal) -> Self {
        let convert = |price: Option<Decimal>| {
            price.map(|p| (p * rate).round_dp(SETTLEMENT_DECIMAL_PRECISION))
        };
        Self {
            open: convert(bar.open),
            high: convert(bar.high),
            low: convert(bar.low),
            close: convert(bar.close),
        }
    }
}

/// How many of an instrument's stored bars carry settlement prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementCoverage {
    pub instrument_id: String,
    pub ticker: String,
    pub total_bars: i64,
    pub normalized_bars: i64,
}

impl SettlementCoverage {
    pub fn missing(&self) -> i64 {
        self.total_bars - self.normalized_bars
    }

    pub fn is_complete(&self) -> bool {
        self.missing() == 0
    }
}

/// Outcome of writing one instrument's bars and refreshing its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitSummary {
    pub bars_written: usize,
    /// `None` when no stored bar falls inside the trailing window.
    pub metrics: Option<TrailingMetrics>,
}
