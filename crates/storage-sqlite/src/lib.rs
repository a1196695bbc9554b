//! SQLite storage implementation for etfwatch.
//!
//! This crate is the only place with Diesel dependencies. It implements the
//! store traits defined in `etfwatch-core`:
//! - Connection pooling and PRAGMA setup
//! - Embedded migrations
//! - A single writer actor that runs every write in its own transaction
//! - Repositories for instruments, daily bars, trailing metrics and FX rates
//!
//! ```text
//! core (engine, traits)
//!          │
//!          ▼
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod fx;
pub mod instruments;
pub mod prices;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use fx::ExchangeRateRepository;
pub use instruments::InstrumentRepository;
pub use prices::PriceRepository;

// Re-export from etfwatch-core for convenience
pub use etfwatch_core::errors::{DatabaseError, Error, Result};
