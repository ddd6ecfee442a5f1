//! Rule-based field extractors for receipts and invoices.
//!
//! Each extractor is an independent pure function of the text; the
//! engine combines their candidates with a per-field resolution policy.

pub mod amounts;
pub mod business_name;
pub mod dates;
pub mod document_type;
pub mod invoice_number;
pub mod patterns;
pub mod vat_number;

pub use amounts::{normalize_amount, select_total, AmountExtractor};
pub use business_name::BusinessNameExtractor;
pub use dates::{normalize_date, parse_date_token, DateExtractor};
pub use document_type::classify_document;
pub use invoice_number::InvoiceNumberExtractor;
pub use vat_number::{extract_vat_number, VatNumberExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A candidate value together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Split text into trimmed, non-empty lines, keeping their order.
pub fn segment_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Characters that glue digit groups into a larger numeric token.
const JOINERS: [char; 5] = ['.', ',', '/', ':', '-'];

/// Whether `text[start..end]` is a whole numeric token.
///
/// The match must not touch another digit, nor a joiner that continues
/// into digits: `28.02` inside `28.02.2024` and `117` inside `117.50`
/// are fragments, not tokens.
pub(crate) fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    is_standalone_with(text, start, end, &JOINERS)
}

/// [`is_standalone`] with a custom set of joining characters.
pub(crate) fn is_standalone_with(text: &str, start: usize, end: usize, joiners: &[char]) -> bool {
    let mut before = text[..start].chars().rev();
    let mut after = text[end..].chars();

    !(glued(before.next(), before.next(), joiners) || glued(after.next(), after.next(), joiners))
}

fn glued(neighbor: Option<char>, beyond: Option<char>, joiners: &[char]) -> bool {
    match neighbor {
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if joiners.contains(&c) => beyond.is_some_and(|d| d.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_lines() {
        let text = "  ABC Store \n\n\t\nTOTAL: 117.50\r\n  Date: 15/03/2024  ";
        assert_eq!(
            segment_lines(text),
            vec!["ABC Store", "TOTAL: 117.50", "Date: 15/03/2024"]
        );
    }

    #[test]
    fn test_standalone_tokens() {
        let text = "Total 117.50 on 28.02.2024";
        let amount = text.find("117.50").unwrap();
        assert!(is_standalone(text, amount, amount + 6));

        let date = text.find("28.02").unwrap();
        assert!(!is_standalone(text, date, date + 5));
    }

    #[test]
    fn test_sentence_punctuation_is_not_a_joiner() {
        let text = "Paid 45.00. Thanks";
        let start = text.find("45.00").unwrap();
        assert!(is_standalone(text, start, start + 5));
    }

    #[test]
    fn test_custom_joiners() {
        let text = "15/03/2024-14:22";
        assert!(!is_standalone(text, 0, 10));
        assert!(is_standalone_with(text, 0, 10, &['.', '/']));
        assert!(!is_standalone_with("15/03/2024/7", 0, 10, &['.', '/']));
    }

    #[test]
    fn test_adjacent_digit_breaks_token() {
        let text = "1234567.89";
        assert!(!is_standalone(text, 1, text.len()));
    }
}
