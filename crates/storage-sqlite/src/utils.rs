//! Text encodings for dates and decimals, plus insert batching.
//!
//! Dates are stored as `YYYY-MM-DD` so lexical order is date order, and
//! decimals as their exact string form.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use etfwatch_core::Result;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Bound parameters allowed in one SQLite statement, with headroom below
/// the default `SQLITE_MAX_VARIABLE_NUMBER` of 32766.
pub const SQLITE_MAX_PARAMS: usize = 30_000;

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, DATE_FORMAT)?)
}

pub fn parse_decimal(value: &str) -> Result<Decimal> {
    Ok(Decimal::from_str(value)?)
}

pub fn parse_optional_decimal(value: Option<&str>) -> Result<Option<Decimal>> {
    value.map(parse_decimal).transpose()
}

pub fn optional_decimal_text(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}

/// Splits rows for multi-row inserts so no statement exceeds
/// [`SQLITE_MAX_PARAMS`] bound parameters.
pub fn chunk_rows<T>(rows: &[T], columns: usize) -> impl Iterator<Item = &[T]> {
    rows.chunks((SQLITE_MAX_PARAMS / columns.max(1)).max(1))
}
