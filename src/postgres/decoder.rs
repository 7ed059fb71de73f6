use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::converter::convert_cell_with;
use super::diagnostics::{DiagnosticSink, TracingSink};
use super::type_tag::TypeTag;
use super::types::{CellValue, ChangePayload, Column, DecodedChange, DecodedRecord, RawRecord};

/// Per-call decoding options.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Types returned verbatim instead of converted.
    pub skip_types: HashSet<TypeTag>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_type(mut self, type_tag: impl Into<TypeTag>) -> Self {
        self.skip_types.insert(type_tag.into());
        self
    }

    pub fn skip_types<I, T>(mut self, type_tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        self.skip_types.extend(type_tags.into_iter().map(Into::into));
        self
    }
}

/// Converts raw text records into native values.
///
/// The decoder holds no mutable state. A single instance can be shared
/// across threads and used for any number of concurrent calls.
#[derive(Clone)]
pub struct RecordDecoder {
    options: DecodeOptions,
    sink: Arc<dyn DiagnosticSink>,
}

impl RecordDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the default tracing sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes every value of `raw` against its column's declared type.
    ///
    /// Keys without a matching column, and columns whose type is in the
    /// skip set, come back unchanged. When several columns share a name the
    /// first one wins. The output always has exactly the keys of `raw`.
    pub fn decode_record(&self, columns: &[Column], raw: &RawRecord) -> DecodedRecord {
        raw.iter()
            .map(|(name, value)| {
                let decoded = self.decode_column(name, columns, value.as_deref());
                (name.clone(), decoded)
            })
            .collect()
    }

    fn decode_column(&self, name: &str, columns: &[Column], value: Option<&str>) -> CellValue {
        match columns.iter().find(|column| column.name == name) {
            Some(column) if !self.options.skip_types.contains(&column.type_tag) => {
                convert_cell_with(self.sink.as_ref(), &column.type_tag, value)
            }
            Some(column) => {
                trace!(column = %name, type_tag = %column.type_tag, "Skipping conversion");
                CellValue::from(value)
            }
            None => {
                trace!(column = %name, "No column descriptor, passing value through");
                CellValue::from(value)
            }
        }
    }

    /// Decodes both row images of a change event using its column list.
    pub fn decode_change(&self, payload: &ChangePayload) -> DecodedChange {
        debug!(
            schema = %payload.schema,
            table = %payload.table,
            op = ?payload.op,
            "Decoding change"
        );

        DecodedChange {
            schema: payload.schema.clone(),
            table: payload.table.clone(),
            op: payload.op,
            commit_timestamp: payload.commit_timestamp.clone(),
            record: payload
                .record
                .as_ref()
                .map(|raw| self.decode_record(&payload.columns, raw)),
            old_record: payload
                .old_record
                .as_ref()
                .map(|raw| self.decode_record(&payload.columns, raw)),
        }
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl fmt::Debug for RecordDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDecoder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Decodes `raw` with the given skip set, logging failures through `tracing`.
///
/// ```
/// use pg_typecast::postgres::{decode_record, CellValue, Column, RawRecord, TypeTag};
/// use std::collections::HashSet;
///
/// let columns = vec![Column::new("first_name", "text"), Column::new("age", "int4")];
/// let raw: RawRecord = [
///     ("first_name".to_string(), Some("Paul".to_string())),
///     ("age".to_string(), Some("33".to_string())),
/// ]
/// .into_iter()
/// .collect();
///
/// let decoded = decode_record(&columns, &raw, &HashSet::new());
/// assert_eq!(decoded["age"], CellValue::Int(33));
///
/// let skipped = decode_record(&columns, &raw, &HashSet::from([TypeTag::Int4]));
/// assert_eq!(skipped["age"], CellValue::Text("33".to_string()));
/// ```
pub fn decode_record(
    columns: &[Column],
    raw: &RawRecord,
    skip_types: &HashSet<TypeTag>,
) -> DecodedRecord {
    let options = DecodeOptions {
        skip_types: skip_types.clone(),
    };
    RecordDecoder::new(options).decode_record(columns, raw)
}
