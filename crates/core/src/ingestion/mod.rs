//! Ingestion module - incremental fetch cycle and settlement backfill.

mod ingestion_config;
mod ingestion_engine;
mod ingestion_model;
mod retry;
mod settlement_backfill;


pub use ingestion_config::IngestionConfig;
pub use ingestion_engine::{next_fetch_start, IngestionEngine};
pub use ingestion_model::{CycleResult, InstrumentOutcome, OutcomeStatus};
pub use retry::{Backoff, RetryPolicy, Sleeper, TokioSleeper};
pub use settlement_backfill::{BackfillOutcome, BackfillResult, SettlementBackfill};
