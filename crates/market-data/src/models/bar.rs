use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data in the instrument's quote currency.
///
/// Every field except the date is optional: providers report gaps as missing
/// values and it is up to the caller to decide whether a gap is acceptable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderBar {
    /// Trading date of the bar
    pub date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<Decimal>,

    /// Shares traded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
}

impl ProviderBar {
    /// Create a bar with every field populated.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// Price fields in open/high/low/close order, paired with their column names.
    pub fn prices(&self) -> [(&'static str, Option<Decimal>); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }
}
