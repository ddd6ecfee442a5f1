//! Extraction engine combining the rule-based field extractors.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{ConfigError, ExtractionError};
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{amount_before_vat, ExtractedInvoice};
use crate::ocr::OcrDocument;

use super::rules::{
    classify_document, parse_date_token, segment_lines, AmountExtractor, BusinessNameExtractor,
    DateExtractor, FieldExtractor, InvoiceNumberExtractor, VatNumberExtractor,
};
use super::{InvoiceExtractor, Result};

/// Result of document extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record.
    pub invoice: ExtractedInvoice,
    /// Raw text the record was extracted from.
    pub raw_text: String,
    /// Fields that fell back to a sentinel or default.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for document parsing.
pub trait InvoiceParser {
    /// Parse a document from OCR text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Rule-based extraction engine.
///
/// Immutable once built; patterns are compiled at construction so one
/// engine can be shared between threads.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ExtractionConfig,
    amounts: AmountExtractor,
    business_name: BusinessNameExtractor,
    invoice_number: InvoiceNumberExtractor,
    vat_number: VatNumberExtractor,
    dates: DateExtractor,
}

impl ExtractionEngine {
    /// Create an engine with the built-in configuration.
    pub fn new() -> Self {
        Self::from_config(ExtractionConfig::default())
            .expect("built-in extraction configuration is valid")
    }

    /// Create an engine from a configuration, compiling its patterns.
    pub fn from_config(config: ExtractionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let amounts = AmountExtractor::new(&config.total_keywords)
            .with_keyword_range(config.keyword_amount_range)
            .with_fallback_range(config.fallback_amount_range);
        let business_name = BusinessNameExtractor::new(&config.generic_terms[..])
            .with_scan_lines(config.business_name_scan_lines);
        let invoice_number = InvoiceNumberExtractor::from_patterns(&config.invoice_number_patterns[..])?;

        Ok(Self {
            config,
            amounts,
            business_name,
            invoice_number,
            vat_number: VatNumberExtractor::new(),
            dates: DateExtractor::new(),
        })
    }

    /// Set the VAT rate used for the pre-VAT amount.
    pub fn with_vat_rate(mut self, vat_rate: Decimal) -> std::result::Result<Self, ConfigError> {
        if vat_rate.is_sign_negative() {
            return Err(ConfigError::InvalidVatRate(vat_rate));
        }
        self.config.vat_rate = vat_rate;
        Ok(self)
    }

    /// Set the provenance note stored with every record.
    pub fn with_service_description(mut self, description: impl Into<String>) -> Self {
        self.config.service_description = description.into();
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse a document, using `today` for an unreadable or missing date.
    pub fn parse_at(&self, text: &str, today: NaiveDate) -> Result<ExtractionResult> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(ExtractionError::NoTextDetected);
        }

        info!("Parsing document from {} characters of text", text.len());

        let mut warnings = Vec::new();
        let lines = segment_lines(text);

        // Total
        let amount_after_vat = match self.amounts.resolve(text) {
            Some(resolved) => {
                if resolved.from_fallback {
                    debug!("Total taken from bare number {:?}", resolved.amount.source);
                    warnings.push(format!(
                        "Total amount guessed from bare number {}",
                        resolved.amount.source
                    ));
                }
                resolved.amount.value
            }
            None => {
                debug!("No amount candidates found");
                warnings.push("Could not extract total amount".to_string());
                Decimal::new(0, 2)
            }
        };
        let before_vat = amount_before_vat(amount_after_vat, self.config.vat_rate);
        debug!("Amount after VAT {}, before VAT {}", amount_after_vat, before_vat);

        // VAT number
        let business_vat_number = match self.vat_number.extract(text) {
            Some(m) => m.value,
            None => {
                debug!("No VAT number found");
                warnings.push("Could not extract VAT number".to_string());
                self.config.unknown_vat_number.clone()
            }
        };

        // Date
        let transaction_date = match self.dates.extract(text) {
            Some(token) => match parse_date_token(&token.value) {
                Some(date) => date,
                None => {
                    debug!("Unparseable date token {:?}", token.value);
                    warnings.push(format!("Invalid date {}, using processing date", token.value));
                    today
                }
            },
            None => {
                debug!("No date token found");
                warnings.push("Could not extract transaction date".to_string());
                today
            }
        };

        // Vendor
        let business_name = match self.business_name.extract(&lines[..]) {
            Some(name) => name,
            None => {
                debug!("No vendor line in the first {} lines", self.config.business_name_scan_lines);
                warnings.push("Could not extract business name".to_string());
                self.config.unknown_vendor.clone()
            }
        };

        let document_type = classify_document(text, &self.config.invoice_keywords[..]);

        let invoice_number = self.invoice_number.extract(text).map(|m| m.value);
        if invoice_number.is_none() {
            warnings.push("Could not extract invoice number".to_string());
        }

        let invoice = ExtractedInvoice {
            document_type,
            business_name,
            business_vat_number,
            amount_before_vat: before_vat,
            amount_after_vat,
            transaction_date,
            invoice_number,
            service_description: self.config.service_description.clone(),
        };

        debug!(
            "Extracted {} from {:?} dated {}",
            invoice.document_type, invoice.business_name, invoice.transaction_date
        );

        Ok(ExtractionResult {
            invoice,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for ExtractionEngine {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        self.parse_at(text, chrono::Local::now().date_naive())
    }
}

impl ExtractionEngine {
    /// Parse an OCR response.
    ///
    /// A blank full-text block is rebuilt from the word annotations.
    pub fn parse_document(&self, document: &OcrDocument) -> Result<ExtractionResult> {
        let text = document.full_text().ok_or(ExtractionError::NoTextDetected)?;

        if text.trim().is_empty() && !document.words().is_empty() {
            debug!("Empty text block, rebuilding from {} words", document.words().len());
            return self.parse(&document.text_from_words());
        }

        self.parse(text)
    }
}

impl InvoiceExtractor for ExtractionEngine {
    fn extract(&self, document: &OcrDocument) -> Result<ExtractedInvoice> {
        self.parse_document(document).map(|r| r.invoice)
    }

    fn extract_from_text(&self, text: &str) -> Result<ExtractedInvoice> {
        self.parse(text).map(|r| r.invoice)
    }
}
