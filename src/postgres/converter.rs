//! Text-format value conversion.
//!
//! [`convert_cell`] is the single place where conversion failures are
//! absorbed: a value that cannot be cast is reported to the diagnostic sink
//! and returned as its original string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::trace;

use super::diagnostics::{ConversionFailure, DiagnosticSink, TracingSink};
use super::type_tag::{Conversion, TypeTag};
use super::types::CellValue;
use crate::error::ConversionError;

/// Converts one text value using the tracing sink for diagnostics.
///
/// ```
/// use pg_typecast::postgres::{convert_cell, CellValue, TypeTag};
///
/// assert_eq!(convert_cell(&TypeTag::Int8, Some("10")), CellValue::Int(10));
/// assert_eq!(convert_cell(&TypeTag::Int8, None), CellValue::Null);
/// ```
pub fn convert_cell(type_tag: &TypeTag, value: Option<&str>) -> CellValue {
    convert_cell_with(&TracingSink, type_tag, value)
}

/// Converts one text value, reporting failures to `sink`.
pub fn convert_cell_with(
    sink: &dyn DiagnosticSink,
    type_tag: &TypeTag,
    value: Option<&str>,
) -> CellValue {
    let Some(text) = value else {
        return CellValue::Null;
    };

    match try_convert(sink, type_tag, text) {
        Ok(converted) => converted,
        Err(error) => {
            sink.conversion_failed(&ConversionFailure {
                type_tag: type_tag.clone(),
                value: text.to_string(),
                error,
            });
            CellValue::Text(text.to_string())
        }
    }
}

fn try_convert(
    sink: &dyn DiagnosticSink,
    type_tag: &TypeTag,
    text: &str,
) -> Result<CellValue, ConversionError> {
    if let TypeTag::Array(element) = type_tag {
        return Ok(CellValue::Array(convert_array_with(sink, text, element)));
    }

    let converted = match type_tag.conversion() {
        Conversion::Boolean => match to_boolean(text) {
            Some(b) => CellValue::Bool(b),
            None => CellValue::Null,
        },
        Conversion::Integer => CellValue::Int(to_int(text)?),
        Conversion::Float => CellValue::Float(to_float(text)?),
        Conversion::Json => CellValue::Json(to_json(text)?),
        Conversion::Timestamp => CellValue::Text(to_timestamp_string(text)),
        Conversion::IntRange => {
            let (low, high) = to_int_range(text)?;
            CellValue::IntRange(low, high)
        }
        Conversion::DateRange => {
            let (low, high) = to_date_range(text)?;
            CellValue::DateRange(low, high)
        }
        Conversion::PassThrough => CellValue::Text(text.to_string()),
    };

    Ok(converted)
}

/// Converts a `{a,b,c}` array literal using the tracing sink for diagnostics.
pub fn convert_array(value: &str, element_type: &TypeTag) -> Vec<CellValue> {
    convert_array_with(&TracingSink, value, element_type)
}

/// Converts a `{a,b,c}` array literal element by element.
///
/// The first and last characters are dropped without checking that they are
/// braces, and the rest is split on every comma. Nested arrays and quoted
/// elements containing commas are therefore split incorrectly; each
/// resulting piece is still converted on its own, so the damage stays within
/// this one column.
pub fn convert_array_with(
    sink: &dyn DiagnosticSink,
    value: &str,
    element_type: &TypeTag,
) -> Vec<CellValue> {
    let mut chars = value.chars();
    chars.next();
    chars.next_back();
    let interior = chars.as_str();

    if interior.is_empty() {
        return Vec::new();
    }

    trace!(element_type = %element_type, "Splitting array literal");

    interior
        .split(',')
        .map(|element| convert_cell_with(sink, element_type, Some(element)))
        .collect()
}

/// `t` and `f` only. Anything else is unknown.
pub fn to_boolean(text: &str) -> Option<bool> {
    match text {
        "t" => Some(true),
        "f" => Some(false),
        _ => None,
    }
}

/// Parses the leading integer of `text`: optional whitespace, optional sign,
/// then digits. Whatever follows the digits is ignored.
pub fn to_int(text: &str) -> Result<i64, ConversionError> {
    let trimmed = text.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let sign_len = trimmed.len() - unsigned.len();

    let digits_len = unsigned
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return Err(ConversionError::InvalidInteger(text.to_string()));
    }

    trimmed[..sign_len + digits_len]
        .parse::<i64>()
        .map_err(|_| ConversionError::InvalidInteger(text.to_string()))
}

pub fn to_float(text: &str) -> Result<f64, ConversionError> {
    let trimmed = text.trim();
    match trimmed {
        "NaN" => return Ok(f64::NAN),
        "Infinity" => return Ok(f64::INFINITY),
        "-Infinity" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }

    // Rust's parser also takes "inf" and "nan" spellings Postgres never emits
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(ConversionError::InvalidFloat(text.to_string()));
    }

    trimmed
        .parse::<f64>()
        .map_err(|_| ConversionError::InvalidFloat(text.to_string()))
}

pub fn to_json(text: &str) -> Result<Value, ConversionError> {
    Ok(serde_json::from_str(text)?)
}

/// Replaces the first space with `T`, e.g. `2019-09-10 00:00:00` becomes
/// `2019-09-10T00:00:00`.
pub fn to_timestamp_string(text: &str) -> String {
    text.replacen(' ', "T", 1)
}

/// Parses a JSON pair such as `["1","10"]` or `[1,10]`.
pub fn to_int_range(text: &str) -> Result<(i64, i64), ConversionError> {
    let (low, high) = range_endpoints(text)?;
    Ok((int_endpoint(&low)?, int_endpoint(&high)?))
}

/// Parses a JSON pair of date-like strings such as
/// `["2020-01-01","2020-02-01"]`.
pub fn to_date_range(text: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ConversionError> {
    let (low, high) = range_endpoints(text)?;
    Ok((date_endpoint(&low)?, date_endpoint(&high)?))
}

/// Parses a date or timestamp as Postgres prints it.
///
/// Values without an offset are taken as UTC, bare dates as midnight UTC.
pub fn to_date(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConversionError::InvalidDate(text.to_string()))
}

fn range_endpoints(text: &str) -> Result<(Value, Value), ConversionError> {
    match to_json(text)? {
        Value::Array(items) if items.len() == 2 => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(low), Some(high)) => Ok((low, high)),
                _ => Err(ConversionError::InvalidRange(text.to_string())),
            }
        }
        _ => Err(ConversionError::InvalidRange(format!(
            "expected a two-element array, got {}",
            text
        ))),
    }
}

fn int_endpoint(endpoint: &Value) -> Result<i64, ConversionError> {
    match endpoint {
        Value::String(s) => to_int(s),
        Value::Number(n) => to_int(&n.to_string()),
        other => Err(ConversionError::InvalidRange(format!(
            "unusable integer endpoint {}",
            other
        ))),
    }
}

fn date_endpoint(endpoint: &Value) -> Result<DateTime<Utc>, ConversionError> {
    match endpoint {
        Value::String(s) => to_date(s),
        // Epoch milliseconds
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| ConversionError::InvalidDate(n.to_string())),
        other => Err(ConversionError::InvalidRange(format!(
            "unusable date endpoint {}",
            other
        ))),
    }
}
