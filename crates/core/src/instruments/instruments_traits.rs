//! Instrument repository trait.

use async_trait::async_trait;

use super::instruments_model::{Instrument, NewInstrument};
use crate::errors::Result;

/// Read access to the tracked instrument set, plus the write used by the
/// reference-data load.
#[async_trait]
pub trait InstrumentRepositoryTrait: Send + Sync {
    /// Active instruments, in storage order.
    fn get_active_instruments(&self) -> Result<Vec<Instrument>>;

    /// Retrieves an instrument by its ID.
    fn get_instrument(&self, instrument_id: &str) -> Result<Instrument>;

    /// Inserts the instrument or overwrites the row with the same ISIN.
    ///
    /// Input is validated before anything is written.
    async fn upsert_instrument(&self, new_instrument: NewInstrument) -> Result<Instrument>;
}
