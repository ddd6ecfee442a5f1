//! Receipt and invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionEngine, ExtractionResult, InvoiceParser};

use crate::error::ExtractionError;
use crate::models::invoice::ExtractedInvoice;
use crate::ocr::OcrDocument;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document field extractors.
pub trait InvoiceExtractor {
    /// Extract a record from an OCR response.
    fn extract(&self, document: &OcrDocument) -> Result<ExtractedInvoice>;

    /// Extract a record from plain text.
    fn extract_from_text(&self, text: &str) -> Result<ExtractedInvoice>;
}
