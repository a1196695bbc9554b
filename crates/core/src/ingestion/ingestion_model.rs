//! Cycle and per-instrument outcome models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::instruments::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// Fetched and committed new bars.
    Updated,
    /// Nothing new to fetch; metrics were refreshed.
    UpToDate,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentOutcome {
    pub instrument_id: String,
    pub ticker: String,
    pub status: OutcomeStatus,
    pub bars_written: usize,
    /// Quote fetch attempts made. Zero when the fetch was skipped.
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstrumentOutcome {
    pub fn updated(instrument: &Instrument, bars_written: usize, attempts: u32) -> Self {
        let status = if bars_written > 0 {
            OutcomeStatus::Updated
        } else {
            OutcomeStatus::UpToDate
        };
        Self {
            instrument_id: instrument.id.clone(),
            ticker: instrument.ticker.clone(),
            status,
            bars_written,
            attempts,
            error: None,
        }
    }

    pub fn failed(instrument: &Instrument, attempts: u32, error: &Error) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            ticker: instrument.ticker.clone(),
            status: OutcomeStatus::Failed,
            bars_written: 0,
            attempts,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }

    pub fn fetch_skipped(&self) -> bool {
        !self.is_failure() && self.attempts == 0
    }
}

/// Tally of one ingestion cycle, returned to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Instruments already current, so no quote fetch was made.
    pub skipped_fetches: usize,
    pub errors: Vec<String>,
    pub outcomes: Vec<InstrumentOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleResult {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped_fetches: 0,
            errors: Vec::new(),
            outcomes: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    pub fn record(&mut self, outcome: InstrumentOutcome) {
        self.total += 1;
        if outcome.is_failure() {
            self.failed += 1;
            self.errors.push(format!(
                "{}: {}",
                outcome.ticker,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        } else {
            self.succeeded += 1;
            if outcome.fetch_skipped() {
                self.skipped_fetches += 1;
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = finished_at;
    }

    /// A cycle succeeds when at least one instrument did.
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    pub fn bars_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.bars_written).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Processed {} instruments: {} succeeded ({} already current), {} failed, {} bars written",
            self.total,
            self.succeeded,
            self.skipped_fetches,
            self.failed,
            self.bars_written()
        )
    }
}
