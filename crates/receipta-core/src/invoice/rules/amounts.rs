//! Amount extraction and normalization.
//!
//! Four independent sources feed one candidate pool; the largest
//! candidate is taken as the grand total. A receipt that prints a larger
//! pre-discount subtotal next to a smaller final total resolves to the
//! subtotal.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use super::patterns::{DECIMAL_COMMA_AMOUNT, DECIMAL_POINT_AMOUNT, DIGIT_RUN, GROUPED_AMOUNT};
use super::{is_standalone, ExtractionMatch, FieldExtractor};
use crate::models::config::AmountRange;

/// Total-amount extractor.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    total_keywords: Vec<String>,
    keyword_range: AmountRange,
    fallback_range: AmountRange,
}

impl AmountExtractor {
    /// Create an extractor with the given total-line keywords.
    pub fn new(total_keywords: &[String]) -> Self {
        Self {
            total_keywords: total_keywords.iter().map(|k| k.to_lowercase()).collect(),
            keyword_range: AmountRange::new(20, 999_999),
            fallback_range: AmountRange::new(10, 50_000),
        }
    }

    /// Set the accepted range for bare integers on total lines.
    pub fn with_keyword_range(mut self, range: AmountRange) -> Self {
        self.keyword_range = range;
        self
    }

    /// Set the accepted range for the last-resort integer fallback.
    pub fn with_fallback_range(mut self, range: AmountRange) -> Self {
        self.fallback_range = range;
        self
    }

    /// Whole-unit amounts from lines that mention a total.
    pub fn total_line_candidates(&self, text: &str) -> Vec<ExtractionMatch<Decimal>> {
        let mut results = Vec::new();
        let mut offset = 0;

        for line in text.split('\n') {
            let lower = line.to_lowercase();
            if self.total_keywords.iter().any(|k| lower.contains(k.as_str())) {
                for m in DIGIT_RUN.find_iter(line) {
                    if !(2..=6).contains(&m.as_str().len()) || !is_standalone(line, m.start(), m.end()) {
                        continue;
                    }
                    let Ok(units) = m.as_str().parse::<u32>() else {
                        continue;
                    };
                    if self.keyword_range.contains(units) {
                        results.push(
                            ExtractionMatch::new(whole_units(units), m.as_str())
                                .with_position(offset + m.start(), offset + m.end()),
                        );
                    }
                }
            }
            offset += line.len() + 1;
        }

        results
    }

    /// First standalone integer in the fallback range, in reading order.
    pub fn fallback(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        DIGIT_RUN
            .find_iter(text)
            .filter(|m| is_standalone(text, m.start(), m.end()))
            .find_map(|m| {
                let units = m.as_str().parse::<u32>().ok()?;
                self.fallback_range.contains(units).then(|| {
                    ExtractionMatch::new(whole_units(units), m.as_str())
                        .with_position(m.start(), m.end())
                })
            })
    }

    /// Resolve the grand total: the largest candidate, else the fallback.
    pub fn resolve(&self, text: &str) -> Option<ResolvedAmount> {
        let candidates = self.extract_all(text);
        if let Some(best) = select_total(&candidates) {
            return Some(ResolvedAmount {
                amount: best.clone(),
                from_fallback: false,
            });
        }

        self.fallback(text).map(|amount| ResolvedAmount {
            amount,
            from_fallback: true,
        })
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new(&crate::models::config::ExtractionConfig::default().total_keywords)
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.resolve(text).map(|r| r.amount)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = decimal_point_candidates(text);
        results.extend(decimal_comma_candidates(text));
        results.extend(self.total_line_candidates(text));
        results.extend(grouped_candidates(text));
        results
    }
}

/// The total chosen for a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAmount {
    pub amount: ExtractionMatch<Decimal>,
    /// Only the last-resort integer scan produced a value.
    pub from_fallback: bool,
}

/// Decimal-point amounts (`117.50`).
pub fn decimal_point_candidates(text: &str) -> Vec<ExtractionMatch<Decimal>> {
    standalone_matches(&DECIMAL_POINT_AMOUNT, text)
}

/// Decimal-comma amounts (`117,50`).
pub fn decimal_comma_candidates(text: &str) -> Vec<ExtractionMatch<Decimal>> {
    standalone_matches(&DECIMAL_COMMA_AMOUNT, text)
}

/// Thousands-grouped amounts (`1,234.56`, `1.234,56`).
pub fn grouped_candidates(text: &str) -> Vec<ExtractionMatch<Decimal>> {
    standalone_matches(&GROUPED_AMOUNT, text)
}

fn standalone_matches(pattern: &Regex, text: &str) -> Vec<ExtractionMatch<Decimal>> {
    pattern
        .find_iter(text)
        .filter(|m| is_standalone(text, m.start(), m.end()))
        .filter_map(|m| match normalize_amount(m.as_str()) {
            Some(amount) => Some(
                ExtractionMatch::new(amount, m.as_str()).with_position(m.start(), m.end()),
            ),
            None => {
                trace!("Discarding unconvertible amount candidate {:?}", m.as_str());
                None
            }
        })
        .collect()
}

/// Pick the largest candidate.
pub fn select_total(candidates: &[ExtractionMatch<Decimal>]) -> Option<&ExtractionMatch<Decimal>> {
    candidates.iter().max_by(|a, b| a.value.cmp(&b.value))
}

/// Normalize a raw amount string into a 2-decimal value.
///
/// A `,` or `.` followed by exactly two trailing digits is the decimal
/// separator; any other separator is thousands grouping and is dropped.
/// Whitespace and currency signs are ignored.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_end_matches([',', '.']);

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let bytes = cleaned.as_bytes();
    let has_decimal = bytes.len() >= 3
        && matches!(bytes[bytes.len() - 3], b',' | b'.')
        && bytes[bytes.len() - 2..].iter().all(u8::is_ascii_digit);

    let (integer_part, fraction) = if has_decimal {
        let (int, frac) = cleaned.split_at(cleaned.len() - 3);
        (int, &frac[1..])
    } else {
        (cleaned, "00")
    };

    let digits: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    let digits = if digits.is_empty() { "0".to_string() } else { digits };

    let mut amount = Decimal::from_str(&format!("{}.{}", digits, fraction)).ok()?;
    amount.rescale(2);
    Some(amount)
}

fn whole_units(units: u32) -> Decimal {
    Decimal::new(i64::from(units) * 100, 2)
}
