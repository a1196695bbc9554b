//! Yahoo Finance market data provider.
//!
//! This provider uses the Yahoo Finance chart API to fetch:
//! - Daily bars for listed instruments (e.g., VUAA.L, CSPX.L)
//! - Historical foreign exchange rates (e.g., USDEUR=X)

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{CurrencyPair, ProviderBar, RateSeries};
use crate::provider::{QuoteProvider, RateProvider};

const PROVIDER_ID: &str = "YAHOO";

/// Decimal places kept for FX rates.
const RATE_DECIMALS: u32 = 6;

/// Yahoo Finance quote and rate provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert a calendar date to the start of that day in UTC.
    fn date_to_offset_datetime(date: NaiveDate) -> OffsetDateTime {
        let dt: DateTime<Utc> = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn map_yahoo_error(symbol: &str, err: yahoo::YahooError) -> MarketDataError {
        let message = err.to_string();
        if message.contains("429") {
            MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            }
        } else if message.to_lowercase().contains("timed out") {
            MarketDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("{}: {}", symbol, message),
            }
        }
    }

    /// Fetch raw Yahoo quotes for `symbol` between two instants, together
    /// with the clock their timestamps have to be read in.
    ///
    /// "No quotes" and "no result" answers are reported as an empty vector.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<(Vec<yahoo::Quote>, ExchangeClock), MarketDataError> {
        let response = match self.connector.get_quote_history(symbol, start, end).await {
            Ok(response) => response,
            Err(yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) => {
                return Ok((Vec::new(), ExchangeClock::Utc))
            }
            Err(e) => return Err(Self::map_yahoo_error(symbol, e)),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) => {
                return Ok((Vec::new(), ExchangeClock::Utc))
            }
            Err(e) => return Err(Self::map_yahoo_error(symbol, e)),
        };

        let clock = match response.metadata() {
            Ok(meta) => ExchangeClock::from_meta(&meta.exchange_timezone_name, meta.gmtoffset),
            Err(e) => {
                warn!("No chart metadata for {}, reading bar dates in UTC: {}", symbol, e);
                ExchangeClock::Utc
            }
        };
        Ok((quotes, clock))
    }
}

/// Time zone a chart's daily timestamps are anchored in.
///
/// Yahoo stamps daily bars at local session start, so FX pairs quoted from
/// London land on 23:00 UTC of the previous day during summer time.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ExchangeClock {
    Utc,
    Zone(Tz),
    Fixed(FixedOffset),
}

impl ExchangeClock {
    /// Prefers the IANA zone (historical DST aware); falls back to the
    /// chart's current GMT offset.
    fn from_meta(timezone_name: &str, gmtoffset: i32) -> Self {
        if let Ok(zone) = timezone_name.parse::<Tz>() {
            return ExchangeClock::Zone(zone);
        }
        match FixedOffset::east_opt(gmtoffset) {
            Some(offset) => ExchangeClock::Fixed(offset),
            None => ExchangeClock::Utc,
        }
    }

    /// Convert the UNIX timestamp of a daily Yahoo bar to its trading date.
    fn trading_date(&self, timestamp: i64) -> Result<NaiveDate, MarketDataError> {
        let date = match self {
            ExchangeClock::Utc => Utc
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|dt| dt.date_naive()),
            ExchangeClock::Zone(zone) => zone
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|dt| dt.date_naive()),
            ExchangeClock::Fixed(offset) => offset
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|dt| dt.date_naive()),
        };
        date.ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid timestamp: {}", timestamp),
        })
    }
}

/// Non-finite prices (Yahoo uses NaN for gaps) become `None`.
fn price(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64_retain(value)
    } else {
        None
    }
}

fn bar_from_parts(
    clock: &ExchangeClock,
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
) -> Result<ProviderBar, MarketDataError> {
    Ok(ProviderBar {
        date: clock.trading_date(timestamp)?,
        open: price(open),
        high: price(high),
        low: price(low),
        close: price(close),
        volume: i64::try_from(volume).ok(),
    })
}

/// Keep one bar per trading date (the last one Yahoo reports wins) and drop
/// anything dated before `start`.
fn dedupe_by_date(bars: Vec<ProviderBar>, start: NaiveDate) -> Vec<ProviderBar> {
    let mut by_date: BTreeMap<NaiveDate, ProviderBar> = BTreeMap::new();
    for bar in bars.into_iter().filter(|b| b.date >= start) {
        by_date.insert(bar.date, bar);
    }
    by_date.into_values().collect()
}

/// Turn `(timestamp, close)` pairs into a rate series, skipping unusable values.
fn rate_series_from_closes(
    clock: &ExchangeClock,
    closes: impl IntoIterator<Item = (i64, f64)>,
    start: NaiveDate,
    end: NaiveDate,
) -> RateSeries {
    let mut series = RateSeries::new();
    for (timestamp, close) in closes {
        let Ok(date) = clock.trading_date(timestamp) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        match price(close) {
            Some(rate) if rate > Decimal::ZERO => {
                series.insert(date, rate.round_dp(RATE_DECIMALS));
            }
            _ => debug!("Skipping unusable rate {} on {}", close, date),
        }
    }
    series
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> Result<Vec<ProviderBar>, MarketDataError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(MarketDataError::InvalidSymbol(ticker.to_string()));
        }

        debug!(
            "Fetching daily bars for {} from {} from Yahoo",
            ticker,
            start.format("%Y-%m-%d")
        );

        let (quotes, clock) = self
            .fetch_history(
                ticker,
                Self::date_to_offset_datetime(start),
                OffsetDateTime::now_utc(),
            )
            .await?;

        let mut bars = Vec::with_capacity(quotes.len());
        for q in quotes {
            match bar_from_parts(
                &clock,
                q.timestamp as i64,
                q.open,
                q.high,
                q.low,
                q.close,
                q.volume,
            ) {
                Ok(bar) => bars.push(bar),
                Err(e) => warn!("Skipping quote for {} due to conversion error: {:?}", ticker, e),
            }
        }

        Ok(dedupe_by_date(bars, start))
    }
}

#[async_trait]
impl RateProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rate_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSeries, MarketDataError> {
        if pair.from.len() != 3 || pair.to.len() != 3 {
            return Err(MarketDataError::InvalidSymbol(pair.to_string()));
        }

        let symbol = pair.yahoo_symbol();
        debug!(
            "Fetching {} rates from {} to {} from Yahoo",
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        // The chart API treats the end instant as exclusive.
        let end_exclusive = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let (quotes, clock) = self
            .fetch_history(
                &symbol,
                Self::date_to_offset_datetime(start),
                Self::date_to_offset_datetime(end_exclusive),
            )
            .await?;

        let series = rate_series_from_closes(
            &clock,
            quotes.iter().map(|q| (q.timestamp as i64, q.close)),
            start,
            end,
        );

        if series.is_empty() {
            warn!("No {} rates returned between {} and {}", symbol, start, end);
        }

        Ok(series)
    }
}
