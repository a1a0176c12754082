//! Batch import pipeline for spreadsheet project rows.
//!
//! # Responsibility
//! - Resolve flexible headers, normalize rows into drafts, deduplicate
//!   against stored projects, allocate codes and commit the batch.
//!
//! # Invariants
//! - Rows are processed strictly in input order.
//! - Every code of a batch is allocated before the first insert.
//! - One failing row never aborts the batch.

pub mod allocator;
pub mod columns;
pub mod committer;
pub mod duplicate;
pub mod preflight;
pub mod processor;

use serde::{Deserialize, Serialize};

/// Default maximum day gap for two dates to count as "similar".
pub const DEFAULT_PROXIMITY_DAYS: i64 = 30;

/// Caller-selected import behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Drop rows that already exist in the store before drafting them.
    pub skip_duplicates: bool,
    /// Day window used by duplicate detection and preflight.
    pub proximity_days: i64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: false,
            proximity_days: DEFAULT_PROXIMITY_DAYS,
        }
    }
}
