use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fx_errors::FxError;
use etfwatch_market_data::CurrencyPair;

/// A historical rate for one currency pair on one date.
///
/// Rows are immutable once cached: historical rates do not change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: NaiveDate,
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Builds a rate for `pair`, rejecting non-positive values.
    pub fn new(pair: &CurrencyPair, rate_date: NaiveDate, rate: Decimal) -> Result<Self, FxError> {
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                pair: pair.to_string(),
                date: rate_date,
                rate,
            });
        }
        Ok(Self {
            from_currency: pair.from.clone(),
            to_currency: pair.to.clone(),
            rate_date,
            rate,
        })
    }
}
