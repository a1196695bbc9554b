//! Incremental ingestion engine.
//!
//! One cycle walks every active instrument in sequence:
//!
//! ```text
//! watermark ─► quote fetch (retry) ─► quality gate ─► normalize ─► commit bars + metrics
//! ```
//!
//! Instrument-scoped failures (transport errors, rejected series, unsupported
//! currencies) are folded into the [`CycleResult`]. Database failures and an
//! empty instrument set abort the cycle.

use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDate, Utc, Weekday};
use log::{debug, error, info, warn};

use super::ingestion_config::IngestionConfig;
use super::ingestion_model::{CycleResult, InstrumentOutcome};
use super::retry::{Sleeper, TokioSleeper};
use crate::errors::{Error, Result};
use crate::fx::{CurrencyNormalizer, FxError};
use crate::instruments::{is_supported_currency, Instrument, InstrumentRepositoryTrait};
use crate::metrics::MetricsWindow;
use crate::prices::{DailyBar, PriceStoreTrait};
use crate::quality::QualityGate;
use etfwatch_market_data::{ProviderBar, QuoteProvider};

/// Accepted series and the number of fetch attempts it took.
struct FetchedSeries {
    bars: Vec<ProviderBar>,
    attempts: u32,
}

/// Last error once retries are exhausted or the error is not retryable.
struct FetchFailure {
    error: Error,
    attempts: u32,
}

pub struct IngestionEngine {
    instruments: Arc<dyn InstrumentRepositoryTrait>,
    prices: Arc<dyn PriceStoreTrait>,
    quotes: Arc<dyn QuoteProvider>,
    normalizer: Arc<CurrencyNormalizer>,
    quality_gate: QualityGate,
    config: IngestionConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl IngestionEngine {
    pub fn new(
        instruments: Arc<dyn InstrumentRepositoryTrait>,
        prices: Arc<dyn PriceStoreTrait>,
        quotes: Arc<dyn QuoteProvider>,
        normalizer: Arc<CurrencyNormalizer>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            instruments,
            prices,
            quotes,
            normalizer,
            quality_gate: QualityGate::with_config(config.quality.clone()),
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the tokio timer used between retries.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Runs one cycle with the local calendar date as "today".
    pub async fn run_cycle(&self) -> Result<CycleResult> {
        self.run_cycle_on(Local::now().date_naive()).await
    }

    /// Runs one cycle treating `today` as the current date.
    ///
    /// Returns `Err` only for structural failures. A cycle in which every
    /// instrument failed still returns `Ok` with `is_success() == false`.
    pub async fn run_cycle_on(&self, today: NaiveDate) -> Result<CycleResult> {
        let mut result = CycleResult::new(Utc::now());

        let instruments = self.instruments.get_active_instruments()?;
        if instruments.is_empty() {
            return Err(Error::NoActiveInstruments);
        }
        info!(
            "Starting ingestion cycle for {} instruments (today {})",
            instruments.len(),
            today
        );

        for instrument in &instruments {
            let outcome = self.ingest_instrument(instrument, today).await?;
            result.record(outcome);
        }

        result.finish(Utc::now());
        if result.is_success() {
            info!("{}", result.summary());
        } else {
            error!("Ingestion cycle failed. {}", result.summary());
        }
        Ok(result)
    }

    /// Brings one instrument up to date.
    ///
    /// `Err` is reserved for structural failures; everything else comes back
    /// as a failed outcome.
    async fn ingest_instrument(
        &self,
        instrument: &Instrument,
        today: NaiveDate,
    ) -> Result<InstrumentOutcome> {
        let watermark = self.prices.latest_bar_date(&instrument.id)?;
        let start = next_fetch_start(watermark, self.config.history_start);
        let window = MetricsWindow::trailing(today, self.config.trailing_window_days);

        if start > today {
            debug!(
                "{} ({}) already current through {}, skipping fetch",
                instrument.ticker, instrument.id, today
            );
            self.prices
                .commit_bars(&instrument.id, Vec::new(), window)
                .await?;
            return Ok(InstrumentOutcome::updated(instrument, 0, 0));
        }

        if !is_supported_currency(&instrument.currency) {
            let error = Error::Fx(FxError::UnsupportedCurrency(instrument.currency.clone()));
            warn!("Skipping {} ({}): {}", instrument.ticker, instrument.id, error);
            return Ok(InstrumentOutcome::failed(instrument, 0, &error));
        }

        let expects_bars = watermark.is_none() || has_weekday_between(start, today);
        let fetched = match self
            .fetch_with_retry(instrument, start, today, expects_bars)
            .await
        {
            Ok(fetched) => fetched,
            Err(failure) => {
                error!(
                    "Giving up on {} ({}) after {} attempts: {}",
                    instrument.ticker, instrument.id, failure.attempts, failure.error
                );
                return Ok(InstrumentOutcome::failed(
                    instrument,
                    failure.attempts,
                    &failure.error,
                ));
            }
        };

        let bars: Vec<DailyBar> = fetched
            .bars
            .into_iter()
            .map(|bar| DailyBar::from_provider(&instrument.id, bar))
            .collect();

        let bars = match self.normalizer.normalize(&instrument.currency, bars).await {
            Ok(bars) => bars,
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                warn!(
                    "Normalization failed for {} ({}): {}",
                    instrument.ticker, instrument.id, e
                );
                return Ok(InstrumentOutcome::failed(instrument, fetched.attempts, &e));
            }
        };

        let summary = self.prices.commit_bars(&instrument.id, bars, window).await?;
        match &summary.metrics {
            Some(metrics) => debug!(
                "{}: {} bars written, trailing high {} on {}, low {} on {}",
                instrument.ticker,
                summary.bars_written,
                metrics.high,
                metrics.high_date,
                metrics.low,
                metrics.low_date
            ),
            None => debug!(
                "{}: {} bars written, no bars inside {}..{}",
                instrument.ticker, summary.bars_written, window.start, window.end
            ),
        }

        Ok(InstrumentOutcome::updated(
            instrument,
            summary.bars_written,
            fetched.attempts,
        ))
    }

    /// Fetches bars dated `[start, today]` and runs them through the gate,
    /// retrying transport errors, rejected series and suspicious empty results.
    async fn fetch_with_retry(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        today: NaiveDate,
        expects_bars: bool,
    ) -> std::result::Result<FetchedSeries, FetchFailure> {
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "Fetching {} from {} via {} (attempt {}/{})",
                instrument.ticker,
                start,
                self.quotes.id(),
                attempt,
                policy.max_attempts
            );

            let error = match self.quotes.fetch_daily_bars(&instrument.ticker, start).await {
                Ok(bars) => {
                    let bars: Vec<ProviderBar> = bars
                        .into_iter()
                        .filter(|bar| bar.date >= start && bar.date <= today)
                        .collect();

                    if bars.is_empty() && !expects_bars {
                        debug!("No new bars for {} since {}", instrument.ticker, start);
                        return Ok(FetchedSeries {
                            bars,
                            attempts: attempt,
                        });
                    }

                    let report = self.quality_gate.evaluate(&bars);
                    if report.passed() {
                        return Ok(FetchedSeries {
                            bars,
                            attempts: attempt,
                        });
                    }
                    Error::Quality(report)
                }
                Err(e) if !e.retry_class().is_retryable() => {
                    return Err(FetchFailure {
                        error: e.into(),
                        attempts: attempt,
                    });
                }
                Err(e) => e.into(),
            };

            if !policy.allows_retry_after(attempt) {
                return Err(FetchFailure {
                    error,
                    attempts: attempt,
                });
            }

            let delay = policy.delay_for(attempt);
            warn!(
                "Attempt {}/{} for {} ({}) failed: {}. Retrying in {}s",
                attempt,
                policy.max_attempts,
                instrument.ticker,
                instrument.id,
                error,
                delay.as_secs()
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

/// The day after the watermark, or the configured history start.
pub fn next_fetch_start(watermark: Option<NaiveDate>, history_start: NaiveDate) -> NaiveDate {
    match watermark {
        Some(date) => date + Duration::days(1),
        None => history_start,
    }
}

/// Whether a trading weekday falls in `[start, end)`.
fn has_weekday_between(start: NaiveDate, end: NaiveDate) -> bool {
    start
        .iter_days()
        .take_while(|date| *date < end)
        .take(7)
        .any(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
}
