//! Transaction date extraction and normalization.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;
use super::{is_standalone_with, ExtractionMatch, FieldExtractor};

/// Separators that continue a date into a longer numeric token. A time
/// glued on with `-`, `,` or `:` does not.
const DATE_JOINERS: [char; 2] = ['.', '/'];

/// Accepted formats after separator canonicalization, with the length of
/// the year field each one applies to.
const DATE_FORMATS: [(&str, usize); 2] = [("%d/%m/%Y", 4), ("%d/%m/%y", 2)];

/// Date token extractor (`DD/MM/YYYY`, `DD.MM.YY`, ...).
#[derive(Debug, Clone, Copy)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .find_iter(text)
            .filter(|m| is_standalone_with(text, m.start(), m.end(), &DATE_JOINERS))
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end()))
            .collect()
    }
}

/// Parse a day-first date token, `.` and `/` being interchangeable.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let canonical = token.trim().replace('.', "/");
    let year_len = canonical.rsplit('/').next().map_or(0, str::len);

    DATE_FORMATS
        .iter()
        .filter(|(_, len)| *len == year_len)
        .find_map(|(format, _)| NaiveDate::parse_from_str(&canonical, format).ok())
}

/// Normalize a date token, falling back to `today` when it does not parse.
pub fn normalize_date(token: &str, today: NaiveDate) -> NaiveDate {
    parse_date_token(token).unwrap_or(today)
}
