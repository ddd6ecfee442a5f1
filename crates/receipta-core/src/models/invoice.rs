//! Extracted invoice/receipt record.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::config::ExtractionConfig;

/// Sentinel used when no vendor line survives the business-name filter.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Sentinel used when no 9-digit VAT number is present.
pub const UNKNOWN_VAT_NUMBER: &str = "Unknown";

/// Structured data extracted from one OCR text.
///
/// Constructed once per parse and never mutated afterwards; the caller
/// assigns it an owner and a category when persisting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Invoice or receipt.
    pub document_type: DocumentType,

    /// Vendor name (never empty).
    pub business_name: String,

    /// 9-digit business/VAT registration number.
    pub business_vat_number: String,

    /// Total before VAT, derived from `amount_after_vat`.
    pub amount_before_vat: Decimal,

    /// Resolved grand total.
    pub amount_after_vat: Decimal,

    /// Transaction date.
    pub transaction_date: NaiveDate,

    /// Invoice number, when one of the number patterns matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Parser provenance annotation.
    pub service_description: String,
}

impl ExtractedInvoice {
    /// Whether the vendor name is the configured sentinel.
    pub fn has_unknown_vendor(&self, config: &ExtractionConfig) -> bool {
        self.business_name == config.unknown_vendor
    }

    /// Fields a reviewer should look at before accepting the record,
    /// judged against the sentinels of the configuration that produced it.
    pub fn review_issues(&self, config: &ExtractionConfig) -> Vec<String> {
        let mut issues = Vec::new();

        if self.has_unknown_vendor(config) {
            issues.push("Unknown vendor".to_string());
        }

        if self.business_vat_number == config.unknown_vat_number {
            issues.push("Missing VAT number".to_string());
        }

        if self.amount_after_vat.is_zero() {
            issues.push("Total amount is zero".to_string());
        }

        issues
    }
}

/// Kind of financial document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// Tax invoice (חשבונית).
    #[serde(rename = "חשבונית", alias = "INVOICE", alias = "invoice")]
    Invoice,
    /// Receipt (קבלה).
    #[default]
    #[serde(rename = "קבלה", alias = "RECEIPT", alias = "receipt")]
    Receipt,
}

impl DocumentType {
    /// Hebrew label as stored by the expense ledger.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "חשבונית",
            DocumentType::Receipt => "קבלה",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::Invoice => write!(f, "INVOICE"),
            DocumentType::Receipt => write!(f, "RECEIPT"),
        }
    }
}

/// Derive the pre-VAT amount from a VAT-inclusive total.
///
/// Non-positive totals, and rates that would give a non-positive divisor,
/// yield zero.
pub fn amount_before_vat(amount_after_vat: Decimal, vat_rate: Decimal) -> Decimal {
    let net = Decimal::ONE
        .checked_add(vat_rate)
        .filter(|divisor| *divisor > Decimal::ZERO)
        .and_then(|divisor| amount_after_vat.checked_div(divisor));

    let Some(net) = net.filter(|_| amount_after_vat > Decimal::ZERO) else {
        return Decimal::new(0, 2);
    };

    let mut net = net.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    net.rescale(2);
    net
}
