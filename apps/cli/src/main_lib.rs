use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use etfwatch_core::fx::CurrencyNormalizer;
use etfwatch_core::ingestion::{IngestionEngine, SettlementBackfill};
use etfwatch_core::prices::PriceStoreTrait;
use etfwatch_market_data::YahooProvider;
use etfwatch_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, ExchangeRateRepository,
    InstrumentRepository, PriceRepository,
};

pub struct AppState {
    pub engine: IngestionEngine,
    pub backfill: SettlementBackfill,
    pub prices: Arc<PriceRepository>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer(pool.as_ref().clone());

    let instruments = Arc::new(InstrumentRepository::new(pool.clone(), writer.clone()));
    let prices = Arc::new(PriceRepository::new(pool.clone(), writer.clone()));
    let rates_cache = Arc::new(ExchangeRateRepository::new(pool, writer));

    let yahoo = Arc::new(YahooProvider::new()?);
    let normalizer = Arc::new(CurrencyNormalizer::new(
        config.ingestion.settlement_currency.clone(),
        rates_cache,
        yahoo.clone(),
    ));

    let engine = IngestionEngine::new(
        instruments.clone(),
        prices.clone(),
        yahoo,
        normalizer.clone(),
        config.ingestion.clone(),
    );
    let backfill = SettlementBackfill::new(instruments, prices.clone(), normalizer);

    Ok(AppState {
        engine,
        backfill,
        prices,
    })
}

/// Logs how many stored bars per instrument still lack settlement prices.
pub fn log_coverage(prices: &dyn PriceStoreTrait) -> anyhow::Result<()> {
    let coverage = prices.settlement_coverage()?;
    for entry in coverage.iter().filter(|c| !c.is_complete()) {
        tracing::warn!(
            "{} ({}): {} of {} bars without settlement prices",
            entry.ticker,
            entry.instrument_id,
            entry.missing(),
            entry.total_bars
        );
    }
    let total: i64 = coverage.iter().map(|c| c.total_bars).sum();
    let normalized: i64 = coverage.iter().map(|c| c.normalized_bars).sum();
    tracing::info!(
        "Settlement coverage: {}/{} bars across {} instruments",
        normalized,
        total,
        coverage.len()
    );
    Ok(())
}
