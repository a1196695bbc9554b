//! Instruments module - tracked securities and their repository trait.

mod instruments_model;
mod instruments_traits;


pub use instruments_model::{is_supported_currency, validate_isin, Instrument, NewInstrument};
pub use instruments_traits::InstrumentRepositoryTrait;
