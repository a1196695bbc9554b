use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::fx_model::ExchangeRate;
use crate::errors::Result;
use etfwatch_market_data::{CurrencyPair, RateSeries};

/// Durable date-keyed cache of historical exchange rates.
#[async_trait]
pub trait ExchangeRateCacheTrait: Send + Sync {
    /// Cached rate for `pair` on `date`, if present.
    fn get_rate(&self, pair: &CurrencyPair, date: NaiveDate) -> Result<Option<Decimal>>;

    /// Every cached rate for `pair` dated within `[start, end]`.
    fn get_rates_in_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSeries>;

    /// Stores rates that are not cached yet. Existing rows are never overwritten.
    ///
    /// Returns the number of rows actually inserted.
    async fn save_rates(&self, rates: Vec<ExchangeRate>) -> Result<usize>;
}
