//! Business/VAT registration number extraction (ח.פ / ע.מ).

use super::patterns::{DIGIT_RUN, VAT_NUMBER_DIGITS};
use super::{ExtractionMatch, FieldExtractor};

/// VAT number extractor: runs of exactly nine digits, in reading order.
///
/// No checksum is verified; the first run wins.
#[derive(Debug, Clone, Copy)]
pub struct VatNumberExtractor;

impl VatNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VatNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VatNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DIGIT_RUN
            .find_iter(text)
            .filter(|m| m.as_str().len() == VAT_NUMBER_DIGITS)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the VAT number from text.
pub fn extract_vat_number(text: &str) -> Option<String> {
    VatNumberExtractor::new().extract(text).map(|m| m.value)
}
