//! Provider trait definitions.
//!
//! Two narrow contracts: [`QuoteProvider`] for daily instrument bars and
//! [`RateProvider`] for historical FX rates. A single source may implement both.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{CurrencyPair, ProviderBar, RateSeries};

/// Source of daily OHLCV bars.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use etfwatch_market_data::provider::QuoteProvider;
///
/// struct CsvProvider;
///
/// #[async_trait]
/// impl QuoteProvider for CsvProvider {
///     fn id(&self) -> &'static str {
///         "CSV"
///     }
///
///     async fn fetch_daily_bars(
///         &self,
///         ticker: &str,
///         start: NaiveDate,
///     ) -> Result<Vec<ProviderBar>, MarketDataError> {
///         // ... read bars on or after `start`
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch every available daily bar from `start` (inclusive) up to the
    /// latest trading day the provider knows about.
    ///
    /// Bars are returned in ascending date order with at most one bar per date.
    /// An empty vector means the provider had nothing for the range.
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> Result<Vec<ProviderBar>, MarketDataError>;
}

/// Source of historical exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the rate series for `pair` between `start` and `end`, both inclusive.
    ///
    /// Dates with no published rate (weekends, holidays) are simply absent.
    async fn fetch_rate_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSeries, MarketDataError>;
}
