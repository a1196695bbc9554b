use diesel::prelude::*;

use crate::utils::{format_date, parse_date, parse_decimal};
use etfwatch_core::fx::ExchangeRate;
use etfwatch_core::{Error, Result};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateDB {
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: String,
    pub rate: String,
    pub created_at: String,
}

impl ExchangeRateDB {
    pub const COLUMNS: usize = 5;

    pub fn from_rate(rate: &ExchangeRate, created_at: &str) -> Self {
        Self {
            from_currency: rate.from_currency.clone(),
            to_currency: rate.to_currency.clone(),
            rate_date: format_date(rate.rate_date),
            rate: rate.rate.to_string(),
            created_at: created_at.to_string(),
        }
    }
}

impl TryFrom<ExchangeRateDB> for ExchangeRate {
    type Error = Error;

    fn try_from(db: ExchangeRateDB) -> Result<Self> {
        Ok(ExchangeRate {
            rate_date: parse_date(&db.rate_date)?,
            rate: parse_decimal(&db.rate)?,
            from_currency: db.from_currency,
            to_currency: db.to_currency,
        })
    }
}
