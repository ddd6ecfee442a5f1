//! Built-in regex patterns for receipt and invoice extraction.
//!
//! Locale-specific tables (total keywords, generic terms, invoice-number
//! patterns) live in [`ExtractionConfig`](crate::models::config::ExtractionConfig);
//! the patterns here describe numeric shapes that do not vary by language.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amounts: 1-6 integer digits, exactly 2 decimals (117.50)
    pub static ref DECIMAL_POINT_AMOUNT: Regex = Regex::new(
        r"[0-9]{1,6}\.[0-9]{2}"
    ).unwrap();

    // Israeli decimal comma (117,50)
    pub static ref DECIMAL_COMMA_AMOUNT: Regex = Regex::new(
        r"[0-9]{1,6},[0-9]{2}"
    ).unwrap();

    // Thousands-grouped with two different separators (1,234.56 or 1.234,56)
    pub static ref GROUPED_AMOUNT: Regex = Regex::new(
        r"[0-9]{1,3}(?:,[0-9]{3})+\.[0-9]{2}|[0-9]{1,3}(?:\.[0-9]{3})+,[0-9]{2}"
    ).unwrap();

    // Any run of ASCII digits
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"[0-9]+"
    ).unwrap();

    // DD/MM/YYYY, DD.MM.YYYY, DD/MM/YY, DD.MM.YY
    pub static ref DATE_DMY: Regex = Regex::new(
        r"([0-9]{1,2})[/.]([0-9]{1,2})[/.]([0-9]{4}|[0-9]{2})"
    ).unwrap();
}

/// Length of a business/VAT registration number.
pub const VAT_NUMBER_DIGITS: usize = 9;
