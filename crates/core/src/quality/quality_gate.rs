//! Data quality gate.
//!
//! Runs every check against a fetched series and collects the findings:
//! - Empty series (stops further checks)
//! - Missing values in price or volume fields
//! - Negative prices
//! - Extreme single-day close moves
//! - Mostly zero-volume series
//!
//! Any finding rejects the series as a whole. Rows are never dropped
//! individually, so an accepted series is always complete.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use etfwatch_market_data::ProviderBar;

/// Which rule produced an issue.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityCheck {
    Empty,
    MissingValues,
    NegativePrice,
    ExtremeMove,
    ZeroVolume,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub check: QualityCheck,
    pub message: String,
}

impl QualityIssue {
    fn new(check: QualityCheck, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

/// Outcome of running the gate over one series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub bar_count: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, check: QualityCheck) -> bool {
        self.issues.iter().any(|i| i.check == check)
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "{} bars passed", self.bar_count);
        }
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Gate thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityGateConfig {
    /// Largest accepted absolute day-over-day relative close change.
    pub max_daily_move: Decimal,
    /// Largest accepted share of zero-volume bars.
    pub max_zero_volume_ratio: Decimal,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            max_daily_move: dec!(0.5),
            max_zero_volume_ratio: dec!(0.5),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QualityGate {
    config: QualityGateConfig,
}

impl QualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityGateConfig) -> Self {
        Self { config }
    }

    /// Evaluate a series in ascending date order.
    pub fn evaluate(&self, bars: &[ProviderBar]) -> QualityReport {
        let mut report = QualityReport {
            bar_count: bars.len(),
            issues: Vec::new(),
        };

        if bars.is_empty() {
            report
                .issues
                .push(QualityIssue::new(QualityCheck::Empty, "No data received"));
            return report;
        }

        self.check_missing_values(bars, &mut report.issues);
        self.check_negative_prices(bars, &mut report.issues);
        self.check_extreme_moves(bars, &mut report.issues);
        self.check_zero_volume(bars, &mut report.issues);

        report
    }

    fn check_missing_values(&self, bars: &[ProviderBar], issues: &mut Vec<QualityIssue>) {
        for (idx, column) in ["open", "high", "low", "close"].iter().enumerate() {
            let missing = bars.iter().filter(|b| b.prices()[idx].1.is_none()).count();
            if missing > 0 {
                issues.push(QualityIssue::new(
                    QualityCheck::MissingValues,
                    format!("Missing {} values in {}", missing, column),
                ));
            }
        }
        let missing_volume = bars.iter().filter(|b| b.volume.is_none()).count();
        if missing_volume > 0 {
            issues.push(QualityIssue::new(
                QualityCheck::MissingValues,
                format!("Missing {} values in volume", missing_volume),
            ));
        }
    }

    fn check_negative_prices(&self, bars: &[ProviderBar], issues: &mut Vec<QualityIssue>) {
        for (idx, column) in ["open", "high", "low", "close"].iter().enumerate() {
            let negative = bars
                .iter()
                .filter(|b| matches!(b.prices()[idx].1, Some(p) if p < Decimal::ZERO))
                .count();
            if negative > 0 {
                issues.push(QualityIssue::new(
                    QualityCheck::NegativePrice,
                    format!("Found {} negative values in {}", negative, column),
                ));
            }
        }
    }

    /// Compares each close with the previous bar's close. Pairs with a
    /// missing close are skipped; a move away from a zero close is unbounded
    /// and always counts.
    fn check_extreme_moves(&self, bars: &[ProviderBar], issues: &mut Vec<QualityIssue>) {
        let extreme = bars
            .windows(2)
            .filter(|pair| match (pair[0].close, pair[1].close) {
                (Some(prev), Some(curr)) if prev.is_zero() => !curr.is_zero(),
                (Some(prev), Some(curr)) => {
                    ((curr - prev) / prev).abs() > self.config.max_daily_move
                }
                _ => false,
            })
            .count();

        if extreme > 0 {
            issues.push(QualityIssue::new(
                QualityCheck::ExtremeMove,
                format!(
                    "Found {} extreme price movements (>{}%)",
                    extreme,
                    (self.config.max_daily_move * Decimal::ONE_HUNDRED).normalize()
                ),
            ));
        }
    }

    fn check_zero_volume(&self, bars: &[ProviderBar], issues: &mut Vec<QualityIssue>) {
        let zero_days = bars.iter().filter(|b| b.volume == Some(0)).count();
        let limit = Decimal::from(bars.len() as u64) * self.config.max_zero_volume_ratio;
        if Decimal::from(zero_days as u64) > limit {
            issues.push(QualityIssue::new(
                QualityCheck::ZeroVolume,
                format!("High number of zero volume days: {}", zero_days),
            ));
        }
    }
}
