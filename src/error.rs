//! Error types for the qrpay library.
//!
//! Structural failures (a payload that cannot be decoded at all) are reported
//! through [`Error`]. Field-level validation problems are data, not errors:
//! they are collected into [`ValidationError`] lists by the `check()` methods
//! and returned to the caller, who decides what to do with an incomplete but
//! parseable payload.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during parsing and serialization operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing or writing CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing or writing XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The input is not a structurally valid SPC payload.
    #[error("not a Swiss QR payload: {0}")]
    NotSwissQr(String),

    /// A version "0200" payload without the mandatory EPD trailer.
    #[error("payload does not contain the mandatory EPD trailer")]
    MissingTrailer,

    /// A serialized record carries a discriminator we have no decoder for.
    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    /// The auto-detector could not classify the input.
    #[error("the data format is not supported for: {0}")]
    UnsupportedFormat(String),

    /// Invalid amount format.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid date format.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// General parsing error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Result of validating one field of a payload.
///
/// The file name is empty unless a batch caller (e.g. a bulk CSV importer)
/// attaches the originating file for context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub file_name: String,
    pub field_name: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_name: &str, message: String) -> Self {
        ValidationError {
            file_name: String::new(),
            field_name: field_name.to_string(),
            message,
        }
    }

    /// Attaches the originating file name, for batch processing contexts.
    pub fn with_file(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

/// A non-fatal problem encountered while decoding.
///
/// Decoding never silently drops data: malformed reference types, unparseable
/// trailing address lines and skipped batch units are reported here alongside
/// the decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Where the problem occurred (e.g. `"unit 2"`, `"address"`).
    pub context: String,
    pub message: String,
}

impl Warning {
    pub fn new(context: &str, message: String) -> Self {
        Warning {
            context: context.to_string(),
            message,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// A decoded value together with the non-fatal warnings collected on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T) -> Self {
        Decoded {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Decoded { value, warnings }
    }
}
