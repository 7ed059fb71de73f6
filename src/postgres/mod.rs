pub mod converter;
pub mod decoder;
pub mod diagnostics;
pub mod type_tag;
pub mod types;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod type_parser_tests;

pub use converter::{convert_array, convert_array_with, convert_cell, convert_cell_with};
pub use decoder::{decode_record, DecodeOptions, RecordDecoder};
pub use diagnostics::{
    CollectingSink, ConversionFailure, CountingSink, DiagnosticSink, NullSink, TracingSink,
};
pub use type_tag::{Conversion, TypeTag, ARRAY_MARKER, MAX_ARRAY_DIMS};
pub use types::*;
