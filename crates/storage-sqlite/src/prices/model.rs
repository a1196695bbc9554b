//! Database models for daily bars and trailing metrics.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};

use crate::utils::{format_date, optional_decimal_text, parse_date, parse_decimal, parse_optional_decimal};
use etfwatch_core::metrics::{DecreaseThresholds, TrailingMetrics};
use etfwatch_core::prices::{DailyBar, SettlementCoverage, SettlementPrices};
use etfwatch_core::{Error, Result};

/// One row of `daily_bars`.
///
/// `is_normalized` carries the all-or-none settlement state; the four
/// settlement columns are only meaningful when it is set.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::daily_bars)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyBarDB {
    pub instrument_id: String,
    pub bar_date: String,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<i64>,
    pub is_normalized: bool,
    pub settlement_open: Option<String>,
    pub settlement_high: Option<String>,
    pub settlement_low: Option<String>,
    pub settlement_close: Option<String>,
}

impl DailyBarDB {
    pub const COLUMNS: usize = 12;
}

impl From<&DailyBar> for DailyBarDB {
    fn from(bar: &DailyBar) -> Self {
        let settlement = bar.settlement.as_ref();
        Self {
            instrument_id: bar.instrument_id.clone(),
            bar_date: format_date(bar.date),
            open: optional_decimal_text(bar.open),
            high: optional_decimal_text(bar.high),
            low: optional_decimal_text(bar.low),
            close: optional_decimal_text(bar.close),
            volume: bar.volume,
            is_normalized: settlement.is_some(),
            settlement_open: optional_decimal_text(settlement.and_then(|s| s.open)),
            settlement_high: optional_decimal_text(settlement.and_then(|s| s.high)),
            settlement_low: optional_decimal_text(settlement.and_then(|s| s.low)),
            settlement_close: optional_decimal_text(settlement.and_then(|s| s.close)),
        }
    }
}

impl TryFrom<DailyBarDB> for DailyBar {
    type Error = Error;

    fn try_from(db: DailyBarDB) -> Result<Self> {
        let settlement = if db.is_normalized {
            Some(SettlementPrices {
                open: parse_optional_decimal(db.settlement_open.as_deref())?,
                high: parse_optional_decimal(db.settlement_high.as_deref())?,
                low: parse_optional_decimal(db.settlement_low.as_deref())?,
                close: parse_optional_decimal(db.settlement_close.as_deref())?,
            })
        } else {
            None
        };

        Ok(DailyBar {
            date: parse_date(&db.bar_date)?,
            instrument_id: db.instrument_id,
            open: parse_optional_decimal(db.open.as_deref())?,
            high: parse_optional_decimal(db.high.as_deref())?,
            low: parse_optional_decimal(db.low.as_deref())?,
            close: parse_optional_decimal(db.close.as_deref())?,
            volume: db.volume,
            settlement,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::trailing_metrics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrailingMetricsDB {
    pub instrument_id: String,
    pub calculation_date: String,
    pub window_start: String,
    pub high: String,
    pub high_date: String,
    pub low: String,
    pub low_date: String,
    pub threshold_10: String,
    pub threshold_15: String,
    pub threshold_20: String,
    pub threshold_25: String,
    pub threshold_30: String,
    pub created_at: String,
}

impl TrailingMetricsDB {
    pub fn from_metrics(metrics: &TrailingMetrics, created_at: &str) -> Self {
        let t = &metrics.thresholds;
        Self {
            instrument_id: metrics.instrument_id.clone(),
            calculation_date: format_date(metrics.calculation_date),
            window_start: format_date(metrics.window_start),
            high: metrics.high.to_string(),
            high_date: format_date(metrics.high_date),
            low: metrics.low.to_string(),
            low_date: format_date(metrics.low_date),
            threshold_10: t.pct_10.to_string(),
            threshold_15: t.pct_15.to_string(),
            threshold_20: t.pct_20.to_string(),
            threshold_25: t.pct_25.to_string(),
            threshold_30: t.pct_30.to_string(),
            created_at: created_at.to_string(),
        }
    }
}

impl TryFrom<TrailingMetricsDB> for TrailingMetrics {
    type Error = Error;

    fn try_from(db: TrailingMetricsDB) -> Result<Self> {
        Ok(TrailingMetrics {
            calculation_date: parse_date(&db.calculation_date)?,
            window_start: parse_date(&db.window_start)?,
            high: parse_decimal(&db.high)?,
            high_date: parse_date(&db.high_date)?,
            low: parse_decimal(&db.low)?,
            low_date: parse_date(&db.low_date)?,
            thresholds: DecreaseThresholds {
                pct_10: parse_decimal(&db.threshold_10)?,
                pct_15: parse_decimal(&db.threshold_15)?,
                pct_20: parse_decimal(&db.threshold_20)?,
                pct_25: parse_decimal(&db.threshold_25)?,
                pct_30: parse_decimal(&db.threshold_30)?,
            },
            instrument_id: db.instrument_id,
        })
    }
}

/// Row of the settlement coverage report query.
#[derive(QueryableByName, Debug, Clone)]
pub struct SettlementCoverageDB {
    #[diesel(sql_type = Text)]
    pub instrument_id: String,
    #[diesel(sql_type = Text)]
    pub ticker: String,
    #[diesel(sql_type = BigInt)]
    pub total_bars: i64,
    #[diesel(sql_type = BigInt)]
    pub normalized_bars: i64,
}

impl From<SettlementCoverageDB> for SettlementCoverage {
    fn from(db: SettlementCoverageDB) -> Self {
        Self {
            instrument_id: db.instrument_id,
            ticker: db.ticker,
            total_bars: db.total_bars,
            normalized_bars: db.normalized_bars,
        }
    }
}
