//! Lenient deserializers for the loosely typed metrics dataset.
//!
//! The dataset was exported from a spreadsheet pipeline: years and ids
//! arrive as either numbers or strings, and missing measurements show up
//! as JSON `null`, an empty string, or the literal string `"null"`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Deserializes an integer that may be encoded as a JSON number or a
/// numeric string (`1990`, `"1990"`, `1990.0`).
///
/// # Errors
///
/// Returns a deserialization error if the value is neither, or is a
/// float with a fractional part.
pub fn integer_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Integer(value) => Ok(value),
        #[allow(clippy::cast_possible_truncation)]
        NumberOrText::Float(value) if value.fract() == 0.0 && value.is_finite() => {
            Ok(value as i64)
        }
        NumberOrText::Float(value) => Err(serde::de::Error::custom(format!(
            "expected an integer, got {value}"
        ))),
        NumberOrText::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {text:?}"))),
    }
}

/// Deserializes an optional measurement.
///
/// JSON `null`, `""`, `"null"`, unparseable text, and non-finite values all
/// become `None`.
///
/// # Errors
///
/// Returns a deserialization error only when the input is not a number,
/// string, or null (e.g. an object).
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<NumberOrText>::deserialize(deserializer)?;

    #[allow(clippy::cast_precision_loss)]
    let number = match value {
        None => None,
        Some(NumberOrText::Integer(value)) => Some(value as f64),
        Some(NumberOrText::Float(value)) => Some(value),
        Some(NumberOrText::Text(text)) => parse_measurement(&text),
    };

    Ok(number.filter(|n| n.is_finite()))
}

fn parse_measurement(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
