use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use super::fx_model::ExchangeRate;
use super::fx_traits::ExchangeRateCacheTrait;
use crate::errors::Result;
use crate::instruments::is_supported_currency;
use crate::prices::{DailyBar, SettlementPrices};
use etfwatch_market_data::{CurrencyPair, RateProvider, RateSeries};

/// Converts bars from their quote currency into the settlement currency.
///
/// Rates come from the exchange-rate cache first. Whatever the cache lacks is
/// fetched from the rate provider with a single range request per batch, and
/// newly learned rates are written back to the cache before they are applied.
pub struct CurrencyNormalizer {
    settlement_currency: String,
    cache: Arc<dyn ExchangeRateCacheTrait>,
    rate_provider: Arc<dyn RateProvider>,
}

impl CurrencyNormalizer {
    pub fn new(
        settlement_currency: impl Into<String>,
        cache: Arc<dyn ExchangeRateCacheTrait>,
        rate_provider: Arc<dyn RateProvider>,
    ) -> Self {
        Self {
            settlement_currency: settlement_currency.into().to_uppercase(),
            cache,
            rate_provider,
        }
    }

    pub fn settlement_currency(&self) -> &str {
        &self.settlement_currency
    }

    fn pair_for(&self, source_currency: &str) -> Result<CurrencyPair> {
        let pair = CurrencyPair::new(source_currency, &self.settlement_currency);
        if !is_supported_currency(&pair.from) {
            return Err(FxError::UnsupportedCurrency(pair.from).into());
        }
        Ok(pair)
    }

    /// Fills `settlement` on every bar of a batch quoted in `source_currency`.
    ///
    /// A bar whose date has no rate keeps `settlement == None`; that degrades
    /// the single bar and never fails the batch. Cache read/write failures
    /// are returned as errors.
    pub async fn normalize(
        &self,
        source_currency: &str,
        bars: Vec<DailyBar>,
    ) -> Result<Vec<DailyBar>> {
        let pair = self.pair_for(source_currency)?;
        if bars.is_empty() {
            return Ok(bars);
        }

        if pair.is_identity() {
            return Ok(bars
                .into_iter()
                .map(DailyBar::with_identity_settlement)
                .collect());
        }

        let rates = self
            .rates_for_dates(&pair, bars.iter().map(|b| b.date))
            .await?;

        let mut missing_dates = Vec::new();
        let normalized: Vec<DailyBar> = bars
            .into_iter()
            .map(|mut bar| {
                bar.settlement = match rates.get(&bar.date) {
                    Some(rate) => Some(SettlementPrices::converted(&bar, *rate)),
                    None => {
                        missing_dates.push(bar.date);
                        None
                    }
                };
                bar
            })
            .collect();

        if !missing_dates.is_empty() {
            warn!(
                "No {} rate for {} of {} bars (first missing {}); settlement prices left empty",
                pair,
                missing_dates.len(),
                normalized.len(),
                missing_dates[0]
            );
        }

        Ok(normalized)
    }

    /// Rate for converting one `source_currency` amount on `date`.
    ///
    /// Same-currency pairs are exactly 1. A cache hit skips the provider.
    pub async fn rate_for_date(
        &self,
        source_currency: &str,
        date: NaiveDate,
    ) -> Result<Option<Decimal>> {
        let pair = self.pair_for(source_currency)?;
        if pair.is_identity() {
            return Ok(Some(Decimal::ONE));
        }
        if let Some(rate) = self.cache.get_rate(&pair, date)? {
            return Ok(Some(rate));
        }
        let rates = self.rates_for_dates(&pair, std::iter::once(date)).await?;
        Ok(rates.get(&date).copied())
    }

    /// Cache-merged rates covering every distinct date in `dates`.
    ///
    /// Makes no provider call when the cache already covers every date, and at
    /// most one range call otherwise.
    async fn rates_for_dates(
        &self,
        pair: &CurrencyPair,
        dates: impl Iterator<Item = NaiveDate>,
    ) -> Result<RateSeries> {
        let wanted: BTreeSet<NaiveDate> = dates.collect();
        let (Some(&start), Some(&end)) = (wanted.first(), wanted.last()) else {
            return Ok(RateSeries::new());
        };

        let mut rates = self.cache.get_rates_in_range(pair, start, end)?;
        if wanted.iter().all(|date| rates.contains_key(date)) {
            debug!("All {} {} rates served from cache", wanted.len(), pair);
            return Ok(rates);
        }

        let fetched = match self.rate_provider.fetch_rate_range(pair, start, end).await {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    "{} rate fetch for {}..{} failed via {}: {}",
                    pair,
                    start,
                    end,
                    self.rate_provider.id(),
                    e
                );
                return Ok(rates);
            }
        };

        let new_rates: Vec<ExchangeRate> = fetched
            .into_iter()
            .filter(|(date, _)| !rates.contains_key(date))
            .filter_map(|(date, rate)| match ExchangeRate::new(pair, date, rate) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    warn!("Discarding provider rate: {}", e);
                    None
                }
            })
            .collect();

        if !new_rates.is_empty() {
            let inserted = self.cache.save_rates(new_rates.clone()).await?;
            debug!("Cached {} new {} rates", inserted, pair);
        }
        rates.extend(new_rates.into_iter().map(|r| (r.rate_date, r.rate)));

        Ok(rates)
    }
}
