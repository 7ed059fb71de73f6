//! Error types and result handling for pg-typecast.
//!
//! This module defines the crate-level error type [`Error`], a convenience
//! [`Result`] alias, and the per-cell [`ConversionError`] raised by the
//! typed converters.
//!
//! A [`ConversionError`] never reaches callers of the record decoder: the
//! cell converter absorbs it, reports it to the diagnostic sink and falls
//! back to the raw string. [`Error`] only surfaces from the pipeline and
//! configuration layers.
//!
//! # Example
//!
//! ```rust
//! use pg_typecast::{Error, Result};
//!
//! fn read_payload(line: &str) -> Result<()> {
//!     if line.is_empty() {
//!         return Err(Error::InvalidMessage {
//!             message: "empty payload".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! match read_payload("") {
//!     Ok(()) => println!("Decoded"),
//!     Err(Error::InvalidMessage { message }) => eprintln!("Bad payload: {}", message),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for pg-typecast operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, from the config file or environment variables.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON serialization error when encoding or decoding payloads.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error on the input or output stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A change payload that could not be understood.
    #[error("Invalid message format: {message}")]
    InvalidMessage {
        /// Description of what was invalid
        message: String,
    },
}

/// Failure to convert a single text value into its native type.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// No leading digit run, or the digits overflow an `i64`.
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    /// Not a floating-point literal.
    #[error("invalid float: {0:?}")]
    InvalidFloat(String),

    /// Structurally invalid JSON document.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Range text that is not a two-element array of usable endpoints.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Text that does not look like a date or timestamp.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

/// A convenient Result type alias for pg-typecast operations.
///
/// This is equivalent to `std::result::Result<T, pg_typecast::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
