//! Flexible calendar date parsing.

use crate::source::{is_null_marker, CellValue};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("valid digit run regex"));

/// Accepted spellings, tried in order; the first successful parse wins.
///
/// Day-first slash dates take precedence over month-first ones, so
/// `01/02/2024` is 1 February.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",  // 2024-12-31
    "%d/%m/%Y",  // 31/12/2024
    "%m/%d/%Y",  // 12/31/2024
    "%d-%m-%Y",  // 31-12-2024
    "%Y/%m/%d",  // 2024/12/31
    "%d.%m.%Y",  // 31.12.2024
    "%B %d, %Y", // December 31, 2024
    "%b %d, %Y", // Dec 31, 2024
];

/// Parses one raw cell into a calendar date.
///
/// Already-typed dates pass through. Empty cells, null markers and text that
/// matches none of the accepted formats yield `None`.
pub fn parse_date(raw: &CellValue) -> Option<NaiveDate> {
    match raw {
        CellValue::Date(date) => Some(*date),
        CellValue::Empty => None,
        other => other.as_text().and_then(|text| parse_date_text(&text)),
    }
}

/// Text-only variant of [`parse_date`].
///
/// The year must be written with exactly four digits; `31/12/24` is rejected
/// rather than read as year 24.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if is_null_marker(trimmed) {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .find(|date| has_four_digit_year(trimmed, *date))
}

fn has_four_digit_year(text: &str, date: NaiveDate) -> bool {
    if !(1000..=9999).contains(&date.year()) {
        return false;
    }
    let year = date.year().to_string();
    DIGIT_RUN_RE
        .find_iter(text)
        .any(|run| run.as_str() == year)
}
