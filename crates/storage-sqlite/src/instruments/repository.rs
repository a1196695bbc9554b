use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::InstrumentDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::instruments;
use crate::schema::instruments::dsl;
use etfwatch_core::errors::{DatabaseError, Error};
use etfwatch_core::instruments::{Instrument, InstrumentRepositoryTrait, NewInstrument};
use etfwatch_core::Result;

pub struct InstrumentRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for InstrumentRepository {
    fn get_active_instruments(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = dsl::instruments
            .filter(dsl::is_active.eq(true))
            .order(dsl::ticker.asc())
            .select(InstrumentDB::as_select())
            .load::<InstrumentDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    fn get_instrument(&self, instrument_id: &str) -> Result<Instrument> {
        let mut conn = get_connection(&self.pool)?;
        dsl::instruments
            .find(instrument_id)
            .select(InstrumentDB::as_select())
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Instrument::from)
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Instrument {}",
                    instrument_id
                )))
            })
    }

    /// Inserts the instrument or updates the row with the same ISIN.
    ///
    /// An existing row keeps its id and creation time so stored bars stay
    /// attached to it.
    async fn upsert_instrument(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        new_instrument.validate()?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Instrument> {
                let existing = dsl::instruments
                    .filter(dsl::isin.eq(&new_instrument.isin))
                    .select(InstrumentDB::as_select())
                    .first::<InstrumentDB>(conn)
                    .optional()
                    .into_core()?;

                let now = Utc::now().to_rfc3339();
                let id = match (&existing, &new_instrument.id) {
                    (Some(row), _) => row.id.clone(),
                    (None, Some(id)) => id.clone(),
                    (None, None) => uuid::Uuid::new_v4().to_string(),
                };
                let mut row = InstrumentDB::from_new(id, new_instrument, &now);
                if let Some(existing) = existing {
                    row.created_at = existing.created_at;
                }

                diesel::insert_into(instruments::table)
                    .values(&row)
                    .on_conflict(dsl::id)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .into_core()?;

                debug!("Upserted instrument {} ({})", row.ticker, row.id);
                Ok(row.into())
            })
            .await
    }
}
