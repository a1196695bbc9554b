//! Database model for instruments.

use diesel::prelude::*;

use etfwatch_core::instruments::{Instrument, NewInstrument};

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: String,
    pub ticker: String,
    pub isin: String,
    pub name: String,
    pub exchange: String,
    pub currency: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl InstrumentDB {
    /// Row for `new_instrument` under `id`, stamped with `now` (RFC 3339).
    pub fn from_new(id: String, new_instrument: NewInstrument, now: &str) -> Self {
        Self {
            id,
            ticker: new_instrument.ticker.trim().to_string(),
            isin: new_instrument.isin,
            name: new_instrument.name.trim().to_string(),
            exchange: new_instrument.exchange.trim().to_string(),
            currency: new_instrument.currency,
            is_active: new_instrument.is_active,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        Self {
            id: db.id,
            ticker: db.ticker,
            isin: db.isin,
            name: db.name,
            exchange: db.exchange,
            currency: db.currency,
            is_active: db.is_active,
        }
    }
}
