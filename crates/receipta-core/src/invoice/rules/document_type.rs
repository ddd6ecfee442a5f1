//! Invoice/receipt classification.

use crate::models::invoice::DocumentType;

/// Classify as an invoice when the lowercased text contains any keyword.
///
/// Keywords are compared as lowercase substrings, not whole words.
pub fn classify_document<S: AsRef<str>>(text: &str, invoice_keywords: &[S]) -> DocumentType {
    let lower = text.to_lowercase();

    if invoice_keywords
        .iter()
        .any(|k| lower.contains(&k.as_ref().to_lowercase()))
    {
        DocumentType::Invoice
    } else {
        DocumentType::Receipt
    }
}
