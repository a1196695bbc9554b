//! FX module - exchange rate cache contract and settlement-currency normalization.

mod currency_normalizer;
mod fx_errors;
mod fx_model;
mod fx_traits;


pub use currency_normalizer::CurrencyNormalizer;
pub use fx_errors::FxError;
pub use fx_model::ExchangeRate;
pub use fx_traits::ExchangeRateCacheTrait;
