use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::fx::CurrencyNormalizer;
use crate::instruments::{Instrument, InstrumentRepositoryTrait};
use crate::prices::{DailyBar, PriceStoreTrait};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillOutcome {
    pub instrument_id: String,
    pub ticker: String,
    /// Stored bars that had no settlement prices.
    pub examined: usize,
    pub normalized: usize,
    pub still_missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResult {
    pub outcomes: Vec<BackfillOutcome>,
    pub failed: usize,
}

impl BackfillResult {
    pub fn normalized(&self) -> usize {
        self.outcomes.iter().map(|o| o.normalized).sum()
    }

    pub fn still_missing(&self) -> usize {
        self.outcomes.iter().map(|o| o.still_missing).sum()
    }
}

/// Fills settlement prices on stored bars that were saved without a rate.
pub struct SettlementBackfill {
    instruments: Arc<dyn InstrumentRepositoryTrait>,
    prices: Arc<dyn PriceStoreTrait>,
    normalizer: Arc<CurrencyNormalizer>,
}

impl SettlementBackfill {
    pub fn new(
        instruments: Arc<dyn InstrumentRepositoryTrait>,
        prices: Arc<dyn PriceStoreTrait>,
        normalizer: Arc<CurrencyNormalizer>,
    ) -> Self {
        Self {
            instruments,
            prices,
            normalizer,
        }
    }

    pub async fn run(&self) -> Result<BackfillResult> {
        let instruments = self.instruments.get_active_instruments()?;
        if instruments.is_empty() {
            return Err(Error::NoActiveInstruments);
        }

        let mut result = BackfillResult::default();
        for instrument in &instruments {
            let outcome = self.backfill_instrument(instrument).await?;
            if outcome.error.is_some() {
                result.failed += 1;
            }
            result.outcomes.push(outcome);
        }

        info!(
            "Settlement backfill into {}: {} bars normalized, {} still missing, {} instruments failed",
            self.normalizer.settlement_currency(),
            result.normalized(),
            result.still_missing(),
            result.failed
        );
        Ok(result)
    }

    async fn backfill_instrument(&self, instrument: &Instrument) -> Result<BackfillOutcome> {
        let mut outcome = BackfillOutcome {
            instrument_id: instrument.id.clone(),
            ticker: instrument.ticker.clone(),
            examined: 0,
            normalized: 0,
            still_missing: 0,
            error: None,
        };

        let pending = self.prices.get_bars_missing_settlement(&instrument.id)?;
        outcome.examined = pending.len();
        if pending.is_empty() {
            return Ok(outcome);
        }

        let normalized = match self.normalizer.normalize(&instrument.currency, pending).await {
            Ok(bars) => bars,
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                warn!(
                    "Settlement backfill failed for {} ({}): {}",
                    instrument.ticker, instrument.id, e
                );
                outcome.still_missing = outcome.examined;
                outcome.error = Some(e.to_string());
                return Ok(outcome);
            }
        };

        let filled: Vec<DailyBar> = normalized
            .into_iter()
            .filter(DailyBar::is_normalized)
            .collect();
        outcome.normalized = if filled.is_empty() {
            0
        } else {
            self.prices.update_settlement_prices(filled).await?
        };
        outcome.still_missing = outcome.examined - outcome.normalized;

        Ok(outcome)
    }
}
