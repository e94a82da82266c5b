//! Tolerant parsing for upstream values that are not schema-guaranteed.
//!
//! Amounts may arrive as numbers, numeric strings or garbage; dates may carry
//! a time of day or be unparseable. These helpers never fail: a bad value
//! becomes "missing" and the caller decides the safe default.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// An amount as the data store sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// A value that already parsed as a decimal, from a JSON number or a numeric string.
    Numeric(Decimal),
    /// Anything else that arrived as a string.
    Text(String),
    /// A value of the wrong type: a boolean, a list, or a number out of decimal range.
    Malformed,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Numeric(Decimal),
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match AmountInput::deserialize(deserializer)? {
            AmountInput::Numeric(value) => RawAmount::Numeric(value),
            AmountInput::Text(text) => RawAmount::Text(text),
            AmountInput::Other(_) => {
                tracing::debug!("Amount of unexpected type treated as non-numeric");
                RawAmount::Malformed
            }
        })
    }
}

impl RawAmount {
    /// Returns the decimal value, or `None` when the amount is not numeric.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawAmount::Numeric(value) => Some(*value),
            RawAmount::Text(text) => parse_decimal(text),
            RawAmount::Malformed => None,
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Numeric(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        match parse_decimal(value) {
            Some(parsed) => RawAmount::Numeric(parsed),
            None => RawAmount::Text(value.to_string()),
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parses a calendar date, discarding any time of day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// datetimes. RFC 3339 values keep the calendar date as written, not the UTC one.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.date())
}

/// Serde adapter for optional dates that tolerates timestamps and garbage.
///
/// Use with `#[serde(default, with = "crate::lenient::calendar_date")]`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateInput {
        Text(String),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Option::<DateInput>::deserialize(deserializer)? {
            None => None,
            Some(DateInput::Text(raw)) => {
                let parsed = super::parse_calendar_date(&raw);
                if parsed.is_none() {
                    tracing::debug!(value = %raw, "Unparseable date treated as missing");
                }
                parsed
            }
            Some(DateInput::Other(_)) => {
                tracing::debug!("Date of unexpected type treated as missing");
                None
            }
        };
        Ok(parsed)
    }

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        date.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_amount_from_json_number_and_string() {
        let number: RawAmount = serde_json::from_str("12.5").unwrap();
        let text: RawAmount = serde_json::from_str("\"99.90\"").unwrap();
        let garbage: RawAmount = serde_json::from_str("\"twelve\"").unwrap();

        assert_eq!(number.to_decimal(), Some(Decimal::new(125, 1)));
        assert_eq!(text.to_decimal(), Some(Decimal::new(9990, 2)));
        assert_eq!(garbage.to_decimal(), None);
    }

    #[test]
    fn test_amount_of_wrong_type_is_malformed() {
        let boolean: RawAmount = serde_json::from_str("true").unwrap();
        let huge: RawAmount = serde_json::from_str("1e40").unwrap();
        let list: RawAmount = serde_json::from_str("[1, 2]").unwrap();

        assert_eq!(boolean, RawAmount::Malformed);
        assert_eq!(huge.to_decimal(), None);
        assert_eq!(list.to_decimal(), None);
    }

    #[test]
    fn test_amount_from_str_keeps_malformed_text() {
        assert_eq!(RawAmount::from(" 7 ").to_decimal(), Some(Decimal::new(7, 0)));
        assert_eq!(RawAmount::from("n/a"), RawAmount::Text("n/a".to_string()));
    }

    #[test]
    fn test_parse_calendar_date_discards_time() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        assert_eq!(parse_calendar_date("2026-01-05"), Some(expected));
        assert_eq!(parse_calendar_date("2026-01-05T23:59:00-03:00"), Some(expected));
        assert_eq!(parse_calendar_date("2026-01-05T08:30:00"), Some(expected));
        assert_eq!(parse_calendar_date("2026-01-05 08:30:00.250"), Some(expected));
        assert_eq!(parse_calendar_date("05/01/2026"), None);
    }
}
