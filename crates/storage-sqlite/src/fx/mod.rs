//! SQLite storage implementation for the exchange rate cache.

mod model;
mod repository;

pub use model::ExchangeRateDB;
pub use repository::ExchangeRateRepository;
