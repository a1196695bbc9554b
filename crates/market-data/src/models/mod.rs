//! Market data models
//!
//! - `bar` - Daily OHLCV bar as returned by a quote provider
//! - `rate` - Currency pairs and date-keyed rate series

mod bar;
mod rate;

pub use bar::ProviderBar;
pub use rate::{CurrencyPair, RateSeries};
