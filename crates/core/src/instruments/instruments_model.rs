//! Instrument domain models.

use serde::{Deserialize, Serialize};

use crate::constants::SUPPORTED_CURRENCIES;
use crate::{errors::ValidationError, Error, Result};

/// A tracked security as registered by the reference-data load.
///
/// The ingestion engine only reads instruments; deactivation is a soft flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    /// Provider ticker (e.g. `VUAA.L`)
    pub ticker: String,
    pub isin: String,
    pub name: String,
    /// Listing venue code (e.g. `LSE`)
    pub exchange: String,
    /// ISO currency the provider quotes prices in
    pub currency: String,
    pub is_active: bool,
}

/// Input model for registering or updating an instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstrument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ticker: String,
    pub isin: String,
    pub name: String,
    pub exchange: String,
    pub currency: String,
    pub is_active: bool,
}

impl NewInstrument {
    /// Validates required fields, the ISIN shape and the quote currency.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("ticker", &self.ticker),
            ("isin", &self.isin),
            ("name", &self.name),
            ("exchange", &self.exchange),
            ("currency", &self.currency),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    field.to_string(),
                )));
            }
        }

        validate_isin(&self.isin)?;

        if !is_supported_currency(&self.currency) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid currency '{}'. Must be one of: {}",
                self.currency,
                SUPPORTED_CURRENCIES.join(", ")
            ))));
        }
        Ok(())
    }
}

/// Checks an ISIN is 2 letters, 9 alphanumerics and a trailing digit.
pub fn validate_isin(isin: &str) -> Result<()> {
    let bytes = isin.as_bytes();
    let well_formed = bytes.len() == 12
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..11]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && bytes[11].is_ascii_digit();

    if well_formed {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::InvalidInput(format!(
            "ISIN '{}' must be 12 characters: 2 letters + 9 alphanumeric + 1 check digit",
            isin
        ))))
    }
}

pub fn is_supported_currency(code: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&code)
}
