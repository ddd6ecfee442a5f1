//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use super::expense::ExpenseCategory;
use super::invoice::{UNKNOWN_VAT_NUMBER, UNKNOWN_VENDOR};

/// Main configuration for receipta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptaConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Expense booking defaults.
    pub expenses: ExpenseConfig,
}

/// Field extraction configuration.
///
/// The keyword and pattern tables are ordered: for the invoice-number
/// patterns the first matching entry wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// VAT rate used to derive the pre-VAT amount (0.17 = 17%).
    pub vat_rate: Decimal,

    /// Words marking a "total" line (matched as lowercase substrings).
    pub total_keywords: Vec<String>,

    /// Words that disqualify a line as the vendor name (whole words; a
    /// multi-word term matches a run of consecutive words).
    pub generic_terms: Vec<String>,

    /// Words classifying the document as an invoice (lowercase substrings).
    pub invoice_keywords: Vec<String>,

    /// Invoice-number regexes, tried in order. Group 1 is the number.
    pub invoice_number_patterns: Vec<String>,

    /// How many leading non-empty lines may hold the vendor name.
    pub business_name_scan_lines: usize,

    /// Accepted bare integers on a total line.
    pub keyword_amount_range: AmountRange,

    /// Accepted bare integers for the last-resort amount fallback.
    pub fallback_amount_range: AmountRange,

    /// Vendor name when none is found.
    pub unknown_vendor: String,

    /// VAT number when none is found.
    pub unknown_vat_number: String,

    /// Provenance note stored with every record.
    pub service_description: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vat_rate: Decimal::new(17, 2),
            total_keywords: strings(&[
                "סה\"כ",
                "סה״כ",
                "סהכ",
                "סך הכל",
                "לתשלום",
                "סכום",
                "total",
                "grand total",
                "amount due",
                "balance due",
                "to pay",
            ]),
            generic_terms: strings(&[
                "חשבונית",
                "קבלה",
                "מס",
                "תאריך",
                "מספר",
                "מס'",
                "מע\"מ",
                "מע״מ",
                "מעמ",
                "ח.פ",
                "ע.מ",
                "עוסק",
                "מורשה",
                "ת.ז",
                "טלפון",
                "טל",
                "סה\"כ",
                "tax",
                "invoice",
                "receipt",
                "date",
                "number",
                "vat",
                "id",
                "total",
                "tel",
                "phone",
            ]),
            invoice_keywords: strings(&["חשבונית", "invoice", "tax invoice"]),
            invoice_number_patterns: strings(&[
                // Hebrew labels
                r"(?:חשבונית|קבלה)(?:\s+מס)?\s*(?:מספר|מס['׳]|#)\s*[:.]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)",
                r"מספר\s+(?:חשבונית|קבלה|מסמך)\s*[:.]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)",
                r"(?:חשבונית|קבלה)(?:\s+מס)?\s+([0-9]{3,})",
                // English labels
                r"(?i)invoice\s*(?:no\b\.?|number|num\b\.?|#)\s*[:.]?\s*([A-Z0-9][A-Z0-9/\-]*)",
                r"(?i)receipt\s*(?:no\b\.?|number|num\b\.?|#)\s*[:.]?\s*([A-Z0-9][A-Z0-9/\-]*)",
                // Generic alphanumeric (INV-00123, RC/2024/17)
                r"\b([A-Z]{2,4}[\-/][0-9]{2,}(?:[\-/][0-9]+)*)\b",
                // #number
                r"#\s*([0-9]{3,})",
                // NO: number
                r"(?i)\bno\s*[:.]\s*([A-Z0-9][A-Z0-9/\-]*)",
            ]),
            business_name_scan_lines: 8,
            keyword_amount_range: AmountRange::new(20, 999_999),
            fallback_amount_range: AmountRange::new(10, 50_000),
            unknown_vendor: UNKNOWN_VENDOR.to_string(),
            unknown_vat_number: UNKNOWN_VAT_NUMBER.to_string(),
            service_description: "Processed via OCR text extraction".to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Check the values that cannot be rejected by deserialization alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vat_rate.is_sign_negative() {
            return Err(ConfigError::InvalidVatRate(self.vat_rate));
        }

        for (name, value) in [
            ("unknown_vendor", &self.unknown_vendor),
            ("unknown_vat_number", &self.unknown_vat_number),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptySentinel(name.to_string()));
            }
        }

        self.keyword_amount_range.validate("keyword_amount_range")?;
        self.fallback_amount_range.validate("fallback_amount_range")?;

        Ok(())
    }
}

/// Inclusive range of whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name: name.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Expense booking defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseConfig {
    /// Category given to newly booked documents.
    pub default_category: ExpenseCategory,

    /// Note attached to newly booked documents.
    pub notes: Option<String>,
}

impl Default for ExpenseConfig {
    fn default() -> Self {
        Self {
            default_category: ExpenseCategory::Other,
            notes: Some("Automatically processed".to_string()),
        }
    }
}

impl ReceiptaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extraction.validate()
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_vat_rate() {
        let config = ExtractionConfig::default();
        assert_eq!(config.vat_rate, Decimal::new(17, 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReceiptaConfig =
            serde_json::from_str(r#"{"extraction": {"vat_rate": 0.18}}"#).unwrap();

        assert_eq!(config.extraction.vat_rate, Decimal::new(18, 2));
        assert_eq!(config.extraction.business_name_scan_lines, 8);
        assert_eq!(config.expenses, ExpenseConfig::default());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let config = ExtractionConfig {
            fallback_amount_range: AmountRange::new(100, 10),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_negative_vat_rate_rejected() {
        let config = ExtractionConfig {
            vat_rate: Decimal::new(-1, 2),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidVatRate(_))));
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let config = ExtractionConfig {
            unknown_vendor: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySentinel(ref name)) if name == "unknown_vendor"
        ));

        let config = ExtractionConfig {
            unknown_vat_number: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptySentinel(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ReceiptaConfig::default();
        config.expenses.default_category = ExpenseCategory::Food;
        config.save(&path).unwrap();

        let loaded = ReceiptaConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
