//! Row-by-row draft construction for one uploaded batch.
//!
//! # Responsibility
//! - Extract canonical fields from each row through the resolved columns.
//! - Apply normalizers and explicit defaults to build validated drafts.
//! - Optionally drop rows that duplicate stored projects.
//!
//! # Invariants
//! - Output drafts keep input order.
//! - Rows without title or principal investigator are skipped silently.
//! - Draft validation failures are recorded per row and never abort the batch.
//! - Store read failures propagate to the caller.

use crate::import::columns::{CanonicalField, ColumnMap};
use crate::import::duplicate::DuplicateDetector;
use crate::model::project::{ProjectDraft, ProjectValidationError, DEFAULT_DESCRIPTION};
use crate::normalize::{clean_amount, detect_currency, normalize_status, parse_date};
use crate::repo::project_repo::{ProjectRepository, RepoResult};
use crate::source::{CellValue, SourceRow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Recorded failure for one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Zero-based position of the row in the upload.
    pub row_index: usize,
    pub title: Option<String>,
    pub message: String,
}

impl Display for RowFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "Project '{title}': {}", self.message),
            None => write!(f, "Row {}: {}", self.row_index + 1, self.message),
        }
    }
}

/// Typed outcome of processing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Draft(ProjectDraft),
    /// Missing title or principal investigator.
    Incomplete,
    /// Matches a stored project and deduplication was requested.
    Duplicate,
    Failed(RowFailure),
}

/// Accumulated result of processing a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedBatch {
    /// Surviving drafts in input order.
    pub drafts: Vec<ProjectDraft>,
    pub failures: Vec<RowFailure>,
    pub duplicates_skipped: usize,
    pub incomplete_skipped: usize,
    /// Rows whose status text matched no known synonym.
    pub unrecognized_statuses: usize,
}

/// Builds drafts from raw rows.
pub struct RecordProcessor<'repo, R: ?Sized> {
    detector: DuplicateDetector<'repo, R>,
}

impl<'repo, R: ProjectRepository + ?Sized> RecordProcessor<'repo, R> {
    pub fn new(repo: &'repo R, proximity_days: i64) -> Self {
        Self {
            detector: DuplicateDetector::with_window(repo, proximity_days),
        }
    }

    /// Processes every row in order and accumulates outcomes.
    pub fn process_batch(
        &self,
        rows: &[SourceRow],
        columns: &ColumnMap,
        skip_duplicates: bool,
    ) -> RepoResult<ProcessedBatch> {
        let mut batch = ProcessedBatch::default();

        for (row_index, row) in rows.iter().enumerate() {
            let reader = RowReader { row, columns };
            match self.process_row(row_index, &reader, skip_duplicates, &mut batch)? {
                RowOutcome::Draft(draft) => batch.drafts.push(draft),
                RowOutcome::Incomplete => batch.incomplete_skipped += 1,
                RowOutcome::Duplicate => batch.duplicates_skipped += 1,
                RowOutcome::Failed(failure) => {
                    warn!(
                        "event=import_row module=import status=error row={} error={}",
                        row_index, failure.message
                    );
                    batch.failures.push(failure);
                }
            }
        }

        debug!(
            "event=import_process module=import status=ok rows={} drafts={} duplicates={} incomplete={} failed={}",
            rows.len(),
            batch.drafts.len(),
            batch.duplicates_skipped,
            batch.incomplete_skipped,
            batch.failures.len()
        );
        Ok(batch)
    }

    fn process_row(
        &self,
        row_index: usize,
        reader: &RowReader<'_>,
        skip_duplicates: bool,
        batch: &mut ProcessedBatch,
    ) -> RepoResult<RowOutcome> {
        let title = reader.text(CanonicalField::Title);
        let investigator = reader.text(CanonicalField::PrincipalInvestigator);
        let (Some(title), Some(investigator)) = (title, investigator) else {
            return Ok(RowOutcome::Incomplete);
        };

        if skip_duplicates {
            let start_date = parse_date(reader.cell(CanonicalField::StartDate));
            let end_date = parse_date(reader.cell(CanonicalField::EndDate));
            if self.detector.is_duplicate(&title, start_date, end_date)? {
                return Ok(RowOutcome::Duplicate);
            }
        }

        let (draft, status_recognized) = build_draft(reader, &title, &investigator);
        if !status_recognized {
            batch.unrecognized_statuses += 1;
            warn!(
                "event=import_status_unrecognized module=import status=defaulted row={} default=Active",
                row_index
            );
        }

        Ok(match draft {
            Ok(draft) => RowOutcome::Draft(draft),
            Err(err) => RowOutcome::Failed(RowFailure {
                row_index,
                title: Some(title),
                message: err.to_string(),
            }),
        })
    }
}

/// Reads canonical fields from one row through the column map.
struct RowReader<'a> {
    row: &'a SourceRow,
    columns: &'a ColumnMap,
}

impl RowReader<'_> {
    fn cell(&self, field: CanonicalField) -> &CellValue {
        self.columns
            .header(field)
            .and_then(|header| self.row.get(header))
            .unwrap_or(&EMPTY_CELL)
    }

    fn text(&self, field: CanonicalField) -> Option<String> {
        self.cell(field).as_text()
    }
}

fn build_draft(
    reader: &RowReader<'_>,
    title: &str,
    investigator: &str,
) -> (Result<ProjectDraft, ProjectValidationError>, bool) {
    let mut draft = ProjectDraft::new(title, investigator);
    draft.description = Some(
        reader
            .text(CanonicalField::Description)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
    );
    draft.category = reader.text(CanonicalField::Category);
    draft.theme = reader.text(CanonicalField::Theme);

    let raw_status = reader
        .text(CanonicalField::Status)
        .unwrap_or_else(|| "Active".to_string());
    let normalized = normalize_status(&raw_status);
    draft.status = normalized.status;

    draft.team_members = reader.cell(CanonicalField::TeamMembers).text_or_empty();
    draft.funding_source = reader.cell(CanonicalField::FundingSource).text_or_empty();

    let budget_text = reader.cell(CanonicalField::Budget).text_or_empty();
    let currency_text = reader.cell(CanonicalField::Currency).text_or_empty();
    draft.currency_code = detect_currency(&budget_text, &currency_text);
    draft.budget_amount = clean_amount(&budget_text);

    draft.start_date = parse_date(reader.cell(CanonicalField::StartDate));
    draft.end_date = parse_date(reader.cell(CanonicalField::EndDate));

    match draft.validate() {
        Ok(()) => (Ok(draft), normalized.recognized),
        Err(err) => (Err(err), normalized.recognized),
    }
}
