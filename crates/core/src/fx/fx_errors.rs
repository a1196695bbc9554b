use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("Currency '{0}' is not supported")]
    UnsupportedCurrency(String),

    #[error("Invalid exchange rate {rate} for {pair} on {date}")]
    InvalidRate {
        pair: String,
        date: NaiveDate,
        rate: Decimal,
    },
}
