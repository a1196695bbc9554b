use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::ExchangeRateDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::exchange_rates;
use crate::schema::exchange_rates::dsl;
use crate::utils::{chunk_rows, format_date, parse_decimal};
use etfwatch_core::fx::{ExchangeRate, ExchangeRateCacheTrait};
use etfwatch_core::Result;
use etfwatch_market_data::{CurrencyPair, RateSeries};

/// Date-keyed cache of historical exchange rates.
///
/// Rows are insert-if-absent: a cached rate is never overwritten.
#[derive(Clone)]
pub struct ExchangeRateRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ExchangeRateRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ExchangeRateCacheTrait for ExchangeRateRepository {
    fn get_rate(&self, pair: &CurrencyPair, date: NaiveDate) -> Result<Option<Decimal>> {
        let mut conn = get_connection(&self.pool)?;
        let rate: Option<String> = dsl::exchange_rates
            .filter(dsl::from_currency.eq(&pair.from))
            .filter(dsl::to_currency.eq(&pair.to))
            .filter(dsl::rate_date.eq(format_date(date)))
            .select(dsl::rate)
            .first(&mut conn)
            .optional()
            .into_core()?;
        rate.as_deref().map(parse_decimal).transpose()
    }

    fn get_rates_in_range(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSeries> {
        let mut conn = get_connection(&self.pool)?;
        let rows = dsl::exchange_rates
            .filter(dsl::from_currency.eq(&pair.from))
            .filter(dsl::to_currency.eq(&pair.to))
            .filter(dsl::rate_date.ge(format_date(start)))
            .filter(dsl::rate_date.le(format_date(end)))
            .select(ExchangeRateDB::as_select())
            .load::<ExchangeRateDB>(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|row| ExchangeRate::try_from(row).map(|r| (r.rate_date, r.rate)))
            .collect()
    }

    async fn save_rates(&self, rates: Vec<ExchangeRate>) -> Result<usize> {
        if rates.is_empty() {
            return Ok(0);
        }
        let now = Utc::now().to_rfc3339();
        let rows: Vec<ExchangeRateDB> = rates
            .iter()
            .map(|rate| ExchangeRateDB::from_rate(rate, &now))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut inserted = 0;
                for chunk in chunk_rows(&rows, ExchangeRateDB::COLUMNS) {
                    inserted += diesel::insert_or_ignore_into(exchange_rates::table)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(inserted)
            })
            .await
    }
}
