//! Non-blocking batch inspection before processing.
//!
//! Warnings never reject a batch; they are logged and carried in the preview.

use crate::import::columns::{CanonicalField, ColumnMap};
use crate::normalize::parse_date;
use crate::source::SourceRow;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Advisory finding about an uploaded batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchWarning {
    EmptyBatch,
    /// Titles that appear on several rows with overlapping dates.
    DuplicateRowsInBatch { titles: Vec<String> },
}

impl Display for BatchWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "no data rows found"),
            Self::DuplicateRowsInBatch { titles } => {
                write!(f, "duplicate projects in batch: {}", titles.join(", "))
            }
        }
    }
}

struct RowKey {
    title: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// Inspects rows for emptiness and intra-batch duplicates.
///
/// Two rows with the same title (trimmed, case-insensitive) are duplicates
/// unless a date present on both rows differs by more than `proximity_days`.
pub fn inspect_rows(
    rows: &[SourceRow],
    columns: &ColumnMap,
    proximity_days: i64,
) -> Vec<BatchWarning> {
    if rows.is_empty() {
        warn!("event=import_preflight module=import status=warn warning=empty_batch");
        return vec![BatchWarning::EmptyBatch];
    }

    let mut by_title: BTreeMap<String, Vec<RowKey>> = BTreeMap::new();
    for row in rows {
        let Some(key) = row_key(row, columns) else {
            continue;
        };
        by_title
            .entry(key.title.to_lowercase())
            .or_default()
            .push(key);
    }

    let titles: Vec<String> = by_title
        .values()
        .filter(|keys| has_near_pair(keys, proximity_days))
        .map(|keys| keys[0].title.clone())
        .collect();

    if titles.is_empty() {
        return Vec::new();
    }

    warn!(
        "event=import_preflight module=import status=warn warning=duplicate_rows count={}",
        titles.len()
    );
    vec![BatchWarning::DuplicateRowsInBatch { titles }]
}

fn row_key(row: &SourceRow, columns: &ColumnMap) -> Option<RowKey> {
    let cell = |field| columns.header(field).and_then(|header| row.get(header));
    let title = cell(CanonicalField::Title)?.as_text()?;
    Some(RowKey {
        title,
        start_date: cell(CanonicalField::StartDate).and_then(parse_date),
        end_date: cell(CanonicalField::EndDate).and_then(parse_date),
    })
}

fn has_near_pair(keys: &[RowKey], proximity_days: i64) -> bool {
    keys.iter().enumerate().any(|(index, left)| {
        keys[index + 1..]
            .iter()
            .any(|right| rows_overlap(left, right, proximity_days))
    })
}

fn rows_overlap(left: &RowKey, right: &RowKey, proximity_days: i64) -> bool {
    within(left.start_date, right.start_date, proximity_days)
        && within(left.end_date, right.end_date, proximity_days)
}

fn within(left: Option<NaiveDate>, right: Option<NaiveDate>, proximity_days: i64) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => (left - right).num_days().abs() <= proximity_days,
        _ => true,
    }
}
