//! Error types for the receipta-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the receipta library.
#[derive(Error, Debug)]
pub enum ReceiptaError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input (configuration or OCR dump).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to document extraction.
///
/// Fields that cannot be determined are not errors: they fall back to
/// sentinel values. Only the absence of any text aborts a parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// OCR produced no annotations, or only whitespace.
    #[error("no text detected")]
    NoTextDetected,
}

/// Errors related to extraction configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An invoice-number pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// VAT rate must not be negative.
    #[error("invalid VAT rate: {0}")]
    InvalidVatRate(Decimal),

    /// A placeholder value (unknown vendor, unknown VAT number) is blank.
    #[error("{0} must not be empty")]
    EmptySentinel(String),

    /// An amount range whose bounds are inverted.
    #[error("invalid range for {name}: {min} > {max}")]
    InvalidRange { name: String, min: u32, max: u32 },
}

/// Result type for the receipta library.
pub type Result<T> = std::result::Result<T, ReceiptaError>;
