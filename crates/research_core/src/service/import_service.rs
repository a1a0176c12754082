//! Batch import use-case service.
//!
//! # Responsibility
//! - Run the pipeline: resolve columns, preflight, process, allocate, commit.
//! - Split the flow into a write-free `preview` and a `confirm` step.
//!
//! # Invariants
//! - `preview` never writes to the store.
//! - Missing required columns reject the whole batch before any row is read.
//! - `confirm` reports partial success and never fails as a whole.

use crate::import::allocator::IdentifierAllocator;
use crate::import::columns::{resolve_columns, ColumnMap, MissingColumnsError};
use crate::import::committer::{ImportBatchResult, ImportCommitter};
use crate::import::preflight::{inspect_rows, BatchWarning};
use crate::import::processor::{RecordProcessor, RowFailure};
use crate::import::ImportOptions;
use crate::model::project::PendingProject;
use crate::repo::project_repo::{ProjectRepository, RepoError};
use crate::source::TabularSource;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Whole-batch import failure.
#[derive(Debug)]
pub enum ImportError {
    /// Required columns are missing; nothing was processed.
    BatchRejected(MissingColumnsError),
    /// Store read failed while processing or allocating.
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BatchRejected(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BatchRejected(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<MissingColumnsError> for ImportError {
    fn from(value: MissingColumnsError) -> Self {
        Self::BatchRejected(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Write-free result of processing an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    pub columns: ColumnMap,
    /// Code-assigned projects ready to commit, in input order.
    pub pending: Vec<PendingProject>,
    pub failures: Vec<RowFailure>,
    pub duplicates_skipped: usize,
    pub incomplete_skipped: usize,
    pub unrecognized_statuses: usize,
    pub warnings: Vec<BatchWarning>,
}

/// Use-case service for spreadsheet batch imports.
pub struct ImportService<R: ProjectRepository> {
    repo: R,
    options: ImportOptions,
}

impl<R: ProjectRepository> ImportService<R> {
    /// Creates a service with default options.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ImportOptions::default())
    }

    pub fn with_options(repo: R, options: ImportOptions) -> Self {
        Self { repo, options }
    }

    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Processes an upload and allocates codes without writing.
    pub fn preview<S: TabularSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<ImportPreview, ImportError> {
        let columns = match resolve_columns(source.headers()) {
            Ok(columns) => columns,
            Err(err) => {
                warn!(
                    "event=import_preview module=import status=rejected missing={}",
                    err.missing.len()
                );
                return Err(err.into());
            }
        };

        let rows = source.rows();
        let warnings = inspect_rows(rows, &columns, self.options.proximity_days);

        let processor = RecordProcessor::new(&self.repo, self.options.proximity_days);
        let processed = processor.process_batch(rows, &columns, self.options.skip_duplicates)?;

        let allocator = IdentifierAllocator::new(&self.repo);
        let pending = allocator.allocate(processed.drafts)?;

        Ok(ImportPreview {
            columns,
            pending,
            failures: processed.failures,
            duplicates_skipped: processed.duplicates_skipped,
            incomplete_skipped: processed.incomplete_skipped,
            unrecognized_statuses: processed.unrecognized_statuses,
            warnings,
        })
    }

    /// Commits a preview.
    ///
    /// `skipped` includes the preview's duplicate skips and `errors` starts
    /// with the preview's row failures.
    pub fn confirm(&self, preview: ImportPreview) -> ImportBatchResult {
        let started_at = Instant::now();
        let committer = ImportCommitter::new(&self.repo, self.options.proximity_days);
        let committed = committer.commit_batch(preview.pending);

        let mut errors: Vec<String> = preview.failures.iter().map(ToString::to_string).collect();
        errors.extend(committed.errors);
        let result = ImportBatchResult {
            succeeded: committed.succeeded,
            skipped: committed.skipped + preview.duplicates_skipped,
            failed: committed.failed + preview.failures.len(),
            total_processed: committed.total_processed,
            errors,
            inserted_codes: committed.inserted_codes,
        };

        info!(
            "event=import_commit module=import status=ok succeeded={} skipped={} failed={} duration_ms={}",
            result.succeeded,
            result.skipped,
            result.failed,
            started_at.elapsed().as_millis()
        );
        result
    }

    /// Preview followed by confirm.
    pub fn import<S: TabularSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<ImportBatchResult, ImportError> {
        let preview = self.preview(source)?;
        Ok(self.confirm(preview))
    }
}
