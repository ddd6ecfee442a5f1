//! Core library for receipt and invoice text extraction.
//!
//! This crate provides:
//! - OCR response types (full text block plus word annotations)
//! - Rule-based field extraction for Hebrew and English documents
//!   (vendor, VAT number, date, totals, document type, invoice number)
//! - Extracted record, expense and configuration models

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;

pub use error::{ConfigError, ExtractionError, ReceiptaError, Result};
pub use invoice::{ExtractionEngine, ExtractionResult, InvoiceExtractor, InvoiceParser};
pub use models::config::{AmountRange, ExpenseConfig, ExtractionConfig, ReceiptaConfig};
pub use models::expense::{Expense, ExpenseCategory, ExpenseFilter};
pub use models::invoice::{amount_before_vat, DocumentType, ExtractedInvoice};
pub use ocr::{OcrDocument, TextAnnotation};
