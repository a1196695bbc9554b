//! Price store trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::prices_model::{CommitSummary, DailyBar, SettlementCoverage};
use crate::errors::Result;
use crate::metrics::{MetricsWindow, TrailingMetrics};

/// Durable store of daily bars and the trailing metrics derived from them.
///
/// Reads are synchronous; writes are async because implementations
/// serialize them through a single writer.
#[async_trait]
pub trait PriceStoreTrait: Send + Sync {
    /// Fetch watermark: the most recent stored bar date for the instrument.
    fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>>;

    /// Bars dated within `[start, end]`, ascending by date.
    fn get_bars_in_range(
        &self,
        instrument_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>>;

    /// Bars with no settlement prices yet, ascending by date.
    fn get_bars_missing_settlement(&self, instrument_id: &str) -> Result<Vec<DailyBar>>;

    /// The most recent metrics row for the instrument, if any.
    fn get_latest_metrics(&self, instrument_id: &str) -> Result<Option<TrailingMetrics>>;

    /// Settlement coverage for every active instrument.
    fn settlement_coverage(&self) -> Result<Vec<SettlementCoverage>>;

    /// Upserts `bars` and recomputes trailing metrics over `window` from the
    /// stored history, as one transaction.
    ///
    /// An empty `bars` only refreshes the metrics. The metrics row for
    /// `window.end` is replaced; older calculation dates are left alone.
    async fn commit_bars(
        &self,
        instrument_id: &str,
        bars: Vec<DailyBar>,
        window: MetricsWindow,
    ) -> Result<CommitSummary>;

    /// Overwrites only the settlement columns of existing bars.
    ///
    /// Returns the number of rows updated.
    async fn update_settlement_prices(&self, bars: Vec<DailyBar>) -> Result<usize>;
}
