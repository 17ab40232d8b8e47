//! The decimal parsing boundary.
//!
//! Monetary values in the remote payload arrive either as JSON numbers or as
//! strings, sometimes with thousands separators ("1,234.56"). Everything
//! downstream of this module works with well-typed `Decimal`s; nothing else
//! in the system parses money.

use crate::error::ApiError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a currency string, tolerating thousands separators.
pub fn parse_decimal(raw: &str) -> Result<Decimal, ApiError> {
    let cleaned = raw.trim().replace(',', "");
    Decimal::from_str(&cleaned)
        .map_err(|e| ApiError::InvalidData(format!("unparseable decimal {raw:?}: {e}")))
}

/// Serde adapter for required number-or-string decimal fields.
///
/// Usage: `#[serde(deserialize_with = "flexible_decimal::deserialize")]`.
pub mod flexible_decimal {
    use super::parse_decimal;
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use serde::de::{Deserializer, Error};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            // Going through the number's string form keeps full precision.
            Raw::Number(n) => Decimal::from_str(&n.to_string()).map_err(Error::custom),
            Raw::Text(s) => parse_decimal(&s).map_err(Error::custom),
        }
    }

    /// Variant for nullable/absent decimal fields.
    pub mod option {
        use super::Raw;
        use super::parse_decimal;
        use rust_decimal::Decimal;
        use serde::de::{Deserialize, Deserializer, Error};
        use std::str::FromStr;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                None => Ok(None),
                Some(Raw::Number(n)) => Decimal::from_str(&n.to_string())
                    .map(Some)
                    .map_err(Error::custom),
                Some(Raw::Text(s)) => parse_decimal(&s).map(Some).map_err(Error::custom),
            }
        }
    }
}
