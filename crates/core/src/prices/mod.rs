//! Prices module - daily bars and the price store contract.

mod prices_model;
mod prices_traits;

pub use prices_model::{CommitSummary, DailyBar, SettlementCoverage, SettlementPrices};
pub use prices_traits::PriceStoreTrait;
