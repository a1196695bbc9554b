//! SQLite storage implementation for instruments.

mod model;
mod repository;

pub use model::InstrumentDB;
pub use repository::InstrumentRepository;
