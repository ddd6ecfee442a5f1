//! Invoice/receipt number extraction.

use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};
use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;

/// Invoice number extractor driven by an ordered pattern list.
///
/// The first pattern that matches anywhere in the text wins. Capture
/// group 1 is the number; a pattern without groups yields its whole match.
#[derive(Debug, Clone)]
pub struct InvoiceNumberExtractor {
    patterns: Vec<Regex>,
}

impl InvoiceNumberExtractor {
    /// Compile the patterns in order.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn match_pattern(pattern: &Regex, text: &str) -> Option<ExtractionMatch<String>> {
        pattern.captures_iter(text).find_map(|caps| {
            let group = caps.get(1).or_else(|| caps.get(0))?;
            let value = group.as_str().trim();
            if value.is_empty() {
                return None;
            }
            Some(
                ExtractionMatch::new(value.to_string(), group.as_str())
                    .with_position(group.start(), group.end()),
            )
        })
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::from_patterns(&ExtractionConfig::default().invoice_number_patterns[..])
            .expect("built-in invoice number patterns compile")
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns
            .iter()
            .find_map(|pattern| Self::match_pattern(pattern, text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .filter_map(|pattern| Self::match_pattern(pattern, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> Option<String> {
        InvoiceNumberExtractor::default().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_hebrew_labels() {
        assert_eq!(number("חשבונית מס 12345"), Some("12345".to_string()));
        assert_eq!(number("חשבונית מס' 5678"), Some("5678".to_string()));
        assert_eq!(number("מספר קבלה: 9001"), Some("9001".to_string()));
    }

    #[test]
    fn test_english_labels() {
        assert_eq!(number("Invoice No: INV-001"), Some("INV-001".to_string()));
        assert_eq!(number("TAX INVOICE NUMBER 2024/17"), Some("2024/17".to_string()));
        assert_eq!(number("Receipt #4567"), Some("4567".to_string()));
    }

    #[test]
    fn test_generic_and_hash() {
        assert_eq!(number("Ref RC/2024/17 paid"), Some("RC/2024/17".to_string()));
        assert_eq!(number("Order #88812"), Some("88812".to_string()));
        assert_eq!(number("NO. A77"), Some("A77".to_string()));
    }

    #[test]
    fn test_label_prefix_is_not_a_number() {
        assert_eq!(number("Invoice Notes: x"), None);
        assert_eq!(number("Receipt Numeric code"), None);
        assert_eq!(number("Invoice No. 123"), Some("123".to_string()));
        assert_eq!(number("Receipt Num. 88"), Some("88".to_string()));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(number("ABC Store\nTOTAL: 117.50\nDate: 15/03/2024"), None);
    }

    #[test]
    fn test_pattern_order_wins() {
        let text = "Order #88812\nInvoice No: INV-001";
        assert_eq!(number(text), Some("INV-001".to_string()));

        let extractor = InvoiceNumberExtractor::from_patterns(&[r"#\s*([0-9]{3,})", r"INV-[0-9]+"]).unwrap();
        assert_eq!(extractor.extract(text).unwrap().value, "88812");
        assert_eq!(extractor.extract_all(text).len(), 2);
    }

    #[test]
    fn test_pattern_without_group() {
        let extractor = InvoiceNumberExtractor::from_patterns(&[r"INV-[0-9]+"]).unwrap();
        let found = extractor.extract("see INV-42 attached").unwrap();
        assert_eq!(found.value, "INV-42");
        assert_eq!(found.position, Some((4, 10)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = InvoiceNumberExtractor::from_patterns(&["(unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_default_pattern_count() {
        let extractor = InvoiceNumberExtractor::default();
        assert_eq!(extractor.len(), ExtractionConfig::default().invoice_number_patterns.len());
        assert!(!extractor.is_empty());
    }
}
