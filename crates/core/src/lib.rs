//! etfwatch core - domain models, store traits and the ingestion engine.
//!
//! This crate is database-agnostic. Storage traits defined here are
//! implemented by the `storage-sqlite` crate; quote and rate providers
//! come from the `market-data` crate.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod ingestion;
pub mod instruments;
pub mod metrics;
pub mod prices;
pub mod quality;

#[cfg(test)]
mod test_fixtures;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
