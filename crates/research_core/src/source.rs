//! Tabular row source consumed by the import pipeline.
//!
//! # Responsibility
//! - Model raw spreadsheet cells without committing to a file format.
//! - Provide a simple in-memory table for callers that already hold rows.
//!
//! # Invariants
//! - Header order and casing are not significant to consumers.
//! - Null markers (`nan`, `none`, `null`, `nat`, blank) read as absent text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const NULL_MARKERS: [&str; 4] = ["nan", "none", "null", "nat"];

/// One raw cell as delivered by a spreadsheet reader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Returns trimmed text content, or `None` for empty and null-marker cells.
    ///
    /// Numbers render without a trailing `.0` for whole values; dates render
    /// as ISO `YYYY-MM-DD`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(value) => {
                let trimmed = value.trim();
                if is_null_marker(trimmed) {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Number(value) if value.is_finite() => Some(value.to_string()),
            Self::Number(_) => None,
            Self::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
        }
    }

    /// Text content or an empty string.
    pub fn text_or_empty(&self) -> String {
        self.as_text().unwrap_or_default()
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Returns whether trimmed text is blank or a spreadsheet null marker.
pub fn is_null_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || NULL_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// One data row keyed by the header text exactly as uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    cells: HashMap<String, CellValue>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell setter.
    pub fn with(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(header.into(), value.into());
    }

    /// Cell under the exact header, if the row carries it.
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }
}

impl<H, V> FromIterator<(H, V)> for SourceRow
where
    H: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = SourceRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

/// Source of ordered tabular rows.
pub trait TabularSource {
    /// Header cells as uploaded.
    fn headers(&self) -> &[String];
    /// Data rows in file order.
    fn rows(&self) -> &[SourceRow];
}

/// Tabular source backed by owned vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryTable {
    headers: Vec<String>,
    rows: Vec<SourceRow>,
}

impl InMemoryTable {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table from header names and positional text cells.
    ///
    /// Short records leave trailing columns empty; extra cells are dropped.
    pub fn from_records<H, R, C>(headers: &[H], records: R) -> Self
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Vec<C>>,
        C: Into<CellValue>,
    {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = records
            .into_iter()
            .map(|record| {
                let mut cells = record.into_iter();
                headers
                    .iter()
                    .map(|header| {
                        let value = cells.next().map(Into::into).unwrap_or_default();
                        (header.clone(), value)
                    })
                    .collect::<SourceRow>()
            })
            .collect();
        Self { headers, rows }
    }
}

impl TabularSource for InMemoryTable {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rows(&self) -> &[SourceRow] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, InMemoryTable, TabularSource};

    #[test]
    fn null_markers_read_as_absent() {
        for raw in ["", "  ", "nan", "NaN", "None", "null", "NaT"] {
            assert_eq!(CellValue::from(raw).as_text(), None, "raw={raw:?}");
        }
        assert_eq!(CellValue::from(" x ").as_text().as_deref(), Some("x"));
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(50000.0).as_text().as_deref(), Some("50000"));
        assert_eq!(CellValue::Number(12.5).as_text().as_deref(), Some("12.5"));
        assert_eq!(CellValue::Number(f64::NAN).as_text(), None);
    }

    #[test]
    fn from_records_pads_short_rows() {
        let table = InMemoryTable::from_records(&["Title", "PI"], vec![vec!["Alpha"]]);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].get("PI"), Some(&CellValue::Empty));
    }
}
