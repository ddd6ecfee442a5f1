//! Vendor name extraction from the document header.

use tracing::trace;

/// Punctuation that can appear in an otherwise numeric line.
const NUMERIC_PUNCTUATION: [char; 8] = ['.', ',', '/', ':', '-', '+', '(', ')'];

/// Business name extractor.
///
/// The vendor header is expected among the first lines; a line is skipped
/// when it is too short, mostly digits, or contains a generic label word
/// such as "invoice" or "תאריך".
#[derive(Debug, Clone)]
pub struct BusinessNameExtractor {
    scan_lines: usize,
    generic_terms: Vec<Vec<String>>,
}

impl BusinessNameExtractor {
    pub fn new<S: AsRef<str>>(generic_terms: &[S]) -> Self {
        Self {
            scan_lines: 8,
            generic_terms: generic_terms
                .iter()
                .map(|t| words(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Set how many leading lines are considered.
    pub fn with_scan_lines(mut self, scan_lines: usize) -> Self {
        self.scan_lines = scan_lines;
        self
    }

    /// Pick the first eligible line among the leading segmented lines.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Option<String> {
        lines
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .take(self.scan_lines)
            .find(|line| match self.rejection(line) {
                Some(reason) => {
                    trace!("Skipping vendor candidate {:?}: {}", line, reason);
                    false
                }
                None => true,
            })
            .map(str::to_string)
    }

    /// Whether a line can be a vendor name.
    pub fn is_eligible(&self, line: &str) -> bool {
        self.rejection(line.trim()).is_none()
    }

    fn rejection(&self, line: &str) -> Option<&'static str> {
        let total = line.chars().count();
        if total < 3 {
            return Some("too short");
        }

        if line
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || NUMERIC_PUNCTUATION.contains(&c))
        {
            return Some("numeric");
        }

        let digits = line.chars().filter(char::is_ascii_digit).count();
        if digits * 2 > total {
            return Some("mostly digits");
        }

        if self.contains_generic_term(line) {
            return Some("generic term");
        }

        None
    }

    /// Whether the line's words contain a term's words as a contiguous run.
    fn contains_generic_term(&self, line: &str) -> bool {
        let line_words = words(line);

        self.generic_terms.iter().any(|term| {
            line_words
                .windows(term.len())
                .any(|window| window == term.as_slice())
        })
    }
}

/// Lowercased words, split at every non-alphanumeric character.
///
/// `/`, `-`, quotes and the Hebrew geresh/gershayim all separate words, so
/// `מע"מ` and `מע״מ` both become `["מע", "מ"]`.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Default for BusinessNameExtractor {
    fn default() -> Self {
        Self::new(&crate::models::config::ExtractionConfig::default().generic_terms[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_generic_hebrew_line() {
        let extractor = BusinessNameExtractor::default();
        let lines = ["חשבונית מס 12345", "קפה נחת בע\"מ", "רחוב הרצל 5"];
        assert_eq!(extractor.extract(&lines), Some("קפה נחת בע\"מ".to_string()));
    }

    #[test]
    fn test_first_eligible_line_wins() {
        let extractor = BusinessNameExtractor::default();
        let lines = ["ABC Store", "TOTAL: 117.50", "Date: 15/03/2024"];
        assert_eq!(extractor.extract(&lines), Some("ABC Store".to_string()));
    }

    #[test]
    fn test_rejections() {
        let extractor = BusinessNameExtractor::default();

        assert!(!extractor.is_eligible("AB"));
        assert!(!extractor.is_eligible("03-5551234"));
        assert!(!extractor.is_eligible("12/03/2024 14:22"));
        assert!(!extractor.is_eligible("A 123456"));
        assert!(!extractor.is_eligible("Tax Invoice"));
        assert!(!extractor.is_eligible("ח.פ. 514321987"));
        assert!(!extractor.is_eligible("Tel: 03-555"));
    }

    #[test]
    fn test_whole_word_terms_only() {
        let extractor = BusinessNameExtractor::default();
        assert!(extractor.is_eligible("David's Hotel"));
        assert!(extractor.is_eligible("Vidal Taxis"));
        assert!(extractor.is_eligible("Cafe 24"));
    }

    #[test]
    fn test_terms_joined_by_punctuation() {
        let extractor = BusinessNameExtractor::default();
        assert!(!extractor.is_eligible("Invoice/Receipt"));
        assert!(!extractor.is_eligible("TAX-INVOICE"));
        assert!(!extractor.is_eligible("חשבונית/קבלה"));
        assert!(!extractor.is_eligible("\"Receipt\""));

        let lines = ["Invoice/Receipt", "ABC Store", "Total 10.00"];
        assert_eq!(extractor.extract(&lines), Some("ABC Store".to_string()));
    }

    #[test]
    fn test_multi_word_term() {
        let extractor = BusinessNameExtractor::new(&["tax invoice"]);
        assert!(!extractor.is_eligible("TAX INVOICE 7"));
        assert!(!extractor.is_eligible("Tax-Invoice copy"));
        assert!(extractor.is_eligible("Tax Advisors Ltd"));
        assert!(extractor.is_eligible("Invoice Tax Shop"));
    }

    #[test]
    fn test_scan_depth() {
        let extractor = BusinessNameExtractor::default().with_scan_lines(2);
        let lines = ["12345", "", "Receipt", "Late Vendor"];
        assert_eq!(extractor.extract(&lines), None);

        let extractor = BusinessNameExtractor::default();
        assert_eq!(extractor.extract(&lines), Some("Late Vendor".to_string()));
    }

    #[test]
    fn test_custom_terms() {
        let extractor = BusinessNameExtractor::new(&["rechnung"]);
        let lines = ["Rechnung Nr. 7", "Bäckerei Müller"];
        assert_eq!(extractor.extract(&lines), Some("Bäckerei Müller".to_string()));
    }
}
