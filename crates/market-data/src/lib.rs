//! etfwatch market data crate
//!
//! Provider contracts and implementations used by the ingestion engine:
//!
//! - [`QuoteProvider`] fetches daily OHLCV bars for a ticker from a start date
//! - [`RateProvider`] fetches a date-keyed FX rate series for a currency pair
//!
//! Both are pure functions of their inputs from the engine's point of view.
//! Failures carry a [`RetryClass`](errors::RetryClass) so callers can decide
//! whether another attempt makes sense.
//!
//! ```text
//! +-------------------+        +-------------------+
//! |  ingestion engine | -----> |   QuoteProvider   |  (ticker, start) -> bars
//! +-------------------+        +-------------------+
//!           |
//!           v
//! +-------------------+        +-------------------+
//! |    normalizer     | -----> |   RateProvider    |  (pair, start, end) -> rates
//! +-------------------+        +-------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::{CurrencyPair, ProviderBar, RateSeries};
pub use provider::yahoo::YahooProvider;
pub use provider::{QuoteProvider, RateProvider};
