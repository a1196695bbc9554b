//! Temporary databases for repository tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::instruments::InstrumentRepository;
use etfwatch_core::instruments::{InstrumentRepositoryTrait, NewInstrument};
use etfwatch_core::prices::DailyBar;

/// A migrated database in a temp directory with a running writer.
pub struct TestDb {
    _dir: TempDir,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("etfwatch-test.db");
        let path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.as_ref().clone());
        Self {
            _dir: dir,
            pool,
            writer,
        }
    }

    pub async fn register(&self, id: &str, ticker: &str, isin: &str, currency: &str) {
        InstrumentRepository::new(self.pool.clone(), self.writer.clone())
            .upsert_instrument(new_instrument(Some(id), ticker, isin, currency))
            .await
            .unwrap();
    }
}

pub fn new_instrument(id: Option<&str>, ticker: &str, isin: &str, currency: &str) -> NewInstrument {
    NewInstrument {
        id: id.map(str::to_string),
        ticker: ticker.to_string(),
        isin: isin.to_string(),
        name: format!("{} UCITS ETF", ticker),
        exchange: "LSE".to_string(),
        currency: currency.to_string(),
        is_active: true,
    }
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Unnormalized bar with high/low one unit around `close`.
pub fn bar(instrument_id: &str, date: &str, close: Decimal) -> DailyBar {
    DailyBar {
        instrument_id: instrument_id.to_string(),
        date: d(date),
        open: Some(close),
        high: Some(close + Decimal::ONE),
        low: Some(close - Decimal::ONE),
        close: Some(close),
        volume: Some(1_000),
        settlement: None,
    }
}
