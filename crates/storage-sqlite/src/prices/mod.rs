//! SQLite storage implementation for daily bars and trailing metrics.

mod model;
mod repository;

pub use model::{DailyBarDB, SettlementCoverageDB, TrailingMetricsDB};
pub use repository::PriceRepository;
