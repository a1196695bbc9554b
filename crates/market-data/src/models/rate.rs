use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange rates keyed by date, ordered ascending.
///
/// An empty series means the provider had no data for the range.
pub type RateSeries = BTreeMap<NaiveDate, Decimal>;

/// A directed currency pair, e.g. USD -> EUR.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into().to_uppercase(),
            to: to.into().to_uppercase(),
        }
    }

    /// Same-currency pairs always convert at exactly 1.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Yahoo Finance FX ticker for this pair (e.g. `USDEUR=X`).
    pub fn yahoo_symbol(&self) -> String {
        format!("{}{}=X", self.from, self.to)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}
