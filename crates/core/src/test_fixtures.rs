//! In-memory collaborators shared by the unit tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{DatabaseError, Error, Result};
use crate::fx::{ExchangeRate, ExchangeRateCacheTrait};
use crate::ingestion::Sleeper;
use crate::instruments::{Instrument, InstrumentRepositoryTrait, NewInstrument};
use crate::metrics::{compute_trailing_metrics, MetricsWindow, TrailingMetrics};
use crate::prices::{CommitSummary, DailyBar, PriceStoreTrait, SettlementCoverage};
use etfwatch_market_data::{
    CurrencyPair, MarketDataError, ProviderBar, QuoteProvider, RateProvider, RateSeries,
};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn instrument(id: &str, ticker: &str, currency: &str) -> Instrument {
    Instrument {
        id: id.to_string(),
        ticker: ticker.to_string(),
        isin: "IE00BFMXXD54".to_string(),
        name: format!("{} UCITS ETF", ticker),
        exchange: "LSE".to_string(),
        currency: currency.to_string(),
        is_active: true,
    }
}

pub fn provider_bar(date: &str, close: Decimal) -> ProviderBar {
    ProviderBar::new(d(date), close, close + Decimal::ONE, close - Decimal::ONE, close, 1_000)
}

/// Consecutive calendar-day bars starting at `start`, closes rising by 1.
pub fn provider_bars(start: &str, count: usize, first_close: Decimal) -> Vec<ProviderBar> {
    (0..count)
        .map(|i| {
            let date = d(start) + chrono::Duration::days(i as i64);
            let close = first_close + Decimal::from(i as i64);
            ProviderBar::new(date, close, close + Decimal::ONE, close - Decimal::ONE, close, 1_000)
        })
        .collect()
}

pub fn stored_bar(instrument_id: &str, date: &str, close: Decimal) -> DailyBar {
    DailyBar::from_provider(instrument_id, provider_bar(date, close))
}

// =========================================================================
// Instruments
// =========================================================================

#[derive(Clone, Default)]
pub struct MockInstrumentRepository {
    pub instruments: Arc<Mutex<Vec<Instrument>>>,
    pub fail_on_read: Arc<Mutex<bool>>,
}

impl MockInstrumentRepository {
    pub fn with_instruments(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: Arc::new(Mutex::new(instruments)),
            ..Self::default()
        }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for MockInstrumentRepository {
    fn get_active_instruments(&self) -> Result<Vec<Instrument>> {
        if *self.fail_on_read.lock().unwrap() {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "Intentional read failure".into(),
            )));
        }
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_active)
            .cloned()
            .collect())
    }

    fn get_instrument(&self, instrument_id: &str) -> Result<Instrument> {
        self.instruments
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == instrument_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(instrument_id.to_string())))
    }

    async fn upsert_instrument(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        new_instrument.validate()?;
        let instrument = Instrument {
            id: new_instrument.id.unwrap_or_else(|| new_instrument.isin.clone()),
            ticker: new_instrument.ticker,
            isin: new_instrument.isin,
            name: new_instrument.name,
            exchange: new_instrument.exchange,
            currency: new_instrument.currency,
            is_active: new_instrument.is_active,
        };
        let mut instruments = self.instruments.lock().unwrap();
        instruments.retain(|i| i.isin != instrument.isin);
        instruments.push(instrument.clone());
        Ok(instrument)
    }
}

// =========================================================================
// Price store
// =========================================================================

#[derive(Clone, Default)]
pub struct MockPriceStore {
    pub bars: Arc<Mutex<BTreeMap<(String, NaiveDate), DailyBar>>>,
    pub metrics: Arc<Mutex<BTreeMap<(String, NaiveDate), TrailingMetrics>>>,
    pub tickers: Arc<Mutex<HashMap<String, String>>>,
    pub commit_calls: Arc<Mutex<Vec<(String, usize)>>>,
    pub fail_on_commit: Arc<Mutex<bool>>,
}

impl MockPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bar(&self, bar: DailyBar) {
        self.bars
            .lock()
            .unwrap()
            .insert((bar.instrument_id.clone(), bar.date), bar);
    }

    pub fn register_ticker(&self, instrument_id: &str, ticker: &str) {
        self.tickers
            .lock()
            .unwrap()
            .insert(instrument_id.to_string(), ticker.to_string());
    }

    pub fn bars_for(&self, instrument_id: &str) -> Vec<DailyBar> {
        self.bars
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.instrument_id == instrument_id)
            .cloned()
            .collect()
    }

    pub fn set_fail_on_commit(&self, fail: bool) {
        *self.fail_on_commit.lock().unwrap() = fail;
    }
}

#[async_trait]
impl PriceStoreTrait for MockPriceStore {
    fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>> {
        Ok(self.bars_for(instrument_id).iter().map(|b| b.date).max())
    }

    fn get_bars_in_range(
        &self,
        instrument_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        Ok(self
            .bars_for(instrument_id)
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }

    fn get_bars_missing_settlement(&self, instrument_id: &str) -> Result<Vec<DailyBar>> {
        Ok(self
            .bars_for(instrument_id)
            .into_iter()
            .filter(|b| b.settlement.is_none())
            .collect())
    }

    fn get_latest_metrics(&self, instrument_id: &str) -> Result<Option<TrailingMetrics>> {
        Ok(self
            .metrics
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.instrument_id == instrument_id)
            .max_by_key(|m| m.calculation_date)
            .cloned())
    }

    fn settlement_coverage(&self) -> Result<Vec<SettlementCoverage>> {
        let tickers = self.tickers.lock().unwrap().clone();
        let mut coverage: Vec<SettlementCoverage> = tickers
            .into_iter()
            .map(|(instrument_id, ticker)| {
                let bars = self.bars_for(&instrument_id);
                SettlementCoverage {
                    total_bars: bars.len() as i64,
                    normalized_bars: bars.iter().filter(|b| b.is_normalized()).count() as i64,
                    instrument_id,
                    ticker,
                }
            })
            .collect();
        coverage.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        Ok(coverage)
    }

    async fn commit_bars(
        &self,
        instrument_id: &str,
        bars: Vec<DailyBar>,
        window: MetricsWindow,
    ) -> Result<CommitSummary> {
        if *self.fail_on_commit.lock().unwrap() {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "Intentional commit failure".into(),
            )));
        }
        self.commit_calls
            .lock()
            .unwrap()
            .push((instrument_id.to_string(), bars.len()));

        let bars_written = bars.len();
        for bar in bars {
            self.insert_bar(bar);
        }

        let stored = self.get_bars_in_range(instrument_id, window.start, window.end)?;
        let metrics = compute_trailing_metrics(instrument_id, &stored, &window);
        if let Some(m) = &metrics {
            self.metrics
                .lock()
                .unwrap()
                .insert((instrument_id.to_string(), m.calculation_date), m.clone());
        }

        Ok(CommitSummary {
            bars_written,
            metrics,
        })
    }

    async fn update_settlement_prices(&self, bars: Vec<DailyBar>) -> Result<usize> {
        let mut stored = self.bars.lock().unwrap();
        let mut updated = 0;
        for bar in bars {
            if let Some(existing) = stored.get_mut(&(bar.instrument_id.clone(), bar.date)) {
                existing.settlement = bar.settlement;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// =========================================================================
// Exchange rate cache
// =========================================================================

#[derive(Clone, Default)]
pub struct MockRateCache {
    pub rates: Arc<Mutex<BTreeMap<(String, String, NaiveDate), Decimal>>>,
    pub save_calls: Arc<Mutex<usize>>,
    pub fail_on_save: Arc<Mutex<bool>>,
}

impl MockRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
        self.rates
            .lock()
            .unwrap()
            .insert((from.to_string(), to.to_string(), date), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.lock().unwrap().len()
    }
}

#[async_trait]
impl ExchangeRateCacheTrait for MockRateCache {
    fn get_rate(&self, pair: &CurrencyPair, date: NaiveDate) -> Result<Option<Decimal>> {
        Ok(self
            .rates
            .lock()
            .unwrap()
            .get(&(pair.from.clone(), pair.to.clone(), date))
            .copied())
    }

    fn get_rates_in_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSeries> {
        Ok(self
            .rates
            .lock()
            .unwrap()
            .iter()
            .filter(|((from, to, date), _)| {
                *from == pair.from && *to == pair.to && *date >= start && *date <= end
            })
            .map(|((_, _, date), rate)| (*date, *rate))
            .collect())
    }

    async fn save_rates(&self, rates: Vec<ExchangeRate>) -> Result<usize> {
        if *self.fail_on_save.lock().unwrap() {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "Intentional cache write failure".into(),
            )));
        }
        *self.save_calls.lock().unwrap() += 1;
        let mut stored = self.rates.lock().unwrap();
        let mut inserted = 0;
        for rate in rates {
            let key = (rate.from_currency, rate.to_currency, rate.rate_date);
            if !stored.contains_key(&key) {
                stored.insert(key, rate.rate);
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

// =========================================================================
// Providers
// =========================================================================

#[derive(Clone, Default)]
pub struct MockRateProvider {
    pub series: Arc<Mutex<HashMap<String, RateSeries>>>,
    pub calls: Arc<Mutex<Vec<(String, NaiveDate, NaiveDate)>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl MockRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the same rate for every date in `[start, end]`.
    pub fn publish_flat(&self, pair: &CurrencyPair, start: NaiveDate, end: NaiveDate, rate: Decimal) {
        let series: RateSeries = start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| (date, rate))
            .collect();
        self.series
            .lock()
            .unwrap()
            .entry(pair.to_string())
            .or_default()
            .extend(series);
    }

    pub fn publish(&self, pair: &CurrencyPair, date: NaiveDate, rate: Decimal) {
        self.series
            .lock()
            .unwrap()
            .entry(pair.to_string())
            .or_default()
            .insert(date, rate);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn fetch_rate_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<RateSeries, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push((pair.to_string(), start, end));
        if *self.fail.lock().unwrap() {
            return Err(MarketDataError::Timeout {
                provider: "MOCK".to_string(),
            });
        }
        Ok(self
            .series
            .lock()
            .unwrap()
            .get(&pair.to_string())
            .map(|series| series.range(start..=end).map(|(d, r)| (*d, *r)).collect())
            .unwrap_or_default())
    }
}

type QuoteResponse = std::result::Result<Vec<ProviderBar>, MarketDataError>;

/// Quote provider answering from per-ticker queues of scripted responses.
/// An exhausted queue answers with an empty series.
#[derive(Clone, Default)]
pub struct MockQuoteProvider {
    pub responses: Arc<Mutex<HashMap<String, VecDeque<QuoteResponse>>>>,
    pub calls: Arc<Mutex<Vec<(String, NaiveDate)>>>,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, ticker: &str, response: QuoteResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(ticker.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls_for(&self, ticker: &str) -> Vec<NaiveDate> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == ticker)
            .map(|(_, start)| *start)
            .collect()
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn fetch_daily_bars(&self, ticker: &str, start: NaiveDate) -> QuoteResponse {
        self.calls.lock().unwrap().push((ticker.to_string(), start));
        self.responses
            .lock()
            .unwrap()
            .get_mut(ticker)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// =========================================================================
// Sleeper
// =========================================================================

#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn total(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }

    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
