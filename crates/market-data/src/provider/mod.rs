//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` and `RateProvider` traits
//! - The Yahoo Finance implementation of both

mod traits;

pub mod yahoo;

// Re-exports
pub use traits::{QuoteProvider, RateProvider};
