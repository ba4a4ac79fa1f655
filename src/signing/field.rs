//! Signature field input as sent by the signing forms.

use chrono::NaiveDate;
use serde::Deserialize;

/// Value collected for a single signature field.
///
/// Sent as `{"kind": "drawn", "value": "data:image/png;base64,..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SignatureFieldValue {
    /// A drawn signature, as an image data URL.
    Drawn(String),
    /// A typed name or initials.
    Typed(String),
    /// A date field; ISO `YYYY-MM-DD` input is rewritten to `M/D/YYYY`.
    Date(String),
}

impl SignatureFieldValue {
    /// The payload stored in the signature block. Empty input stays empty so
    /// the signing flow can reject it.
    pub fn into_payload(self) -> String {
        match self {
            SignatureFieldValue::Drawn(data) => data.trim().to_string(),
            SignatureFieldValue::Typed(text) => text.trim().to_string(),
            SignatureFieldValue::Date(raw) => {
                let raw = raw.trim();
                match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(date) => display_date(date),
                    Err(_) => raw.to_string(),
                }
            }
        }
    }
}

/// `M/D/YYYY`, without zero padding.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
