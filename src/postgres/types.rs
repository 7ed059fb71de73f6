use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::type_tag::TypeTag;

/// Name and declared type of one column of a change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
}

impl Column {
    pub fn new(name: impl Into<String>, type_tag: impl Into<TypeTag>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// Column name to text value; `None` is SQL `NULL`.
pub type RawRecord = BTreeMap<String, Option<String>>;

/// Column name to natively typed value. Same key set as the [`RawRecord`]
/// it was decoded from.
pub type DecodedRecord = BTreeMap<String, CellValue>;

/// A column value after conversion from its text representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
    /// `[low, high]` of an `int4range`/`int8range`.
    IntRange(i64, i64),
    /// `[low, high]` of a `daterange`/`tsrange`/`tstzrange`.
    DateRange(DateTime<Utc>, DateTime<Utc>),
    Array(Vec<CellValue>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CellValue]> {
        match self {
            CellValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON rendering, as written by the pipeline.
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing this enum cannot fail: every variant maps onto JSON
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<Option<&str>> for CellValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => CellValue::Text(s.to_string()),
            None => CellValue::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// A change event as delivered by the upstream transport.
///
/// `record` carries the new row image (inserts and updates) and
/// `old_record` the previous one (updates and deletes, subject to the
/// table's replica identity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePayload {
    pub schema: String,
    pub table: String,
    #[serde(rename = "type")]
    pub op: ChangeOperation,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub record: Option<RawRecord>,
    #[serde(default)]
    pub old_record: Option<RawRecord>,
}

/// A [`ChangePayload`] with both row images converted to native values.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedChange {
    pub schema: String,
    pub table: String,
    #[serde(rename = "type")]
    pub op: ChangeOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_timestamp: Option<String>,
    pub record: Option<DecodedRecord>,
    pub old_record: Option<DecodedRecord>,
}
