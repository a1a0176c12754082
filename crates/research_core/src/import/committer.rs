//! Per-record persistence of an allocated batch.
//!
//! # Invariants
//! - Every pending project is re-checked for duplicates right before insert.
//! - Each insert is its own unit of work; one failure never rolls back
//!   previously committed records.
//! - Partial success is reported, never raised.

use crate::import::duplicate::DuplicateDetector;
use crate::model::code::ProjectCode;
use crate::model::project::PendingProject;
use crate::repo::project_repo::{ProjectRepository, RepoResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// Outcome counts for one committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatchResult {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Pending projects handed to the committer.
    pub total_processed: usize,
    /// One message per failure, keyed by project title.
    pub errors: Vec<String>,
    /// Codes inserted, in commit order.
    pub inserted_codes: Vec<ProjectCode>,
}

enum CommitOutcome {
    Inserted(ProjectCode),
    Duplicate,
}

/// Commits pending projects to one project store.
pub struct ImportCommitter<'repo, R: ?Sized> {
    repo: &'repo R,
    detector: DuplicateDetector<'repo, R>,
}

impl<'repo, R: ProjectRepository + ?Sized> ImportCommitter<'repo, R> {
    pub fn new(repo: &'repo R, proximity_days: i64) -> Self {
        Self {
            repo,
            detector: DuplicateDetector::with_window(repo, proximity_days),
        }
    }

    /// Inserts each pending project, counting successes, skips and failures.
    pub fn commit_batch(&self, pending: Vec<PendingProject>) -> ImportBatchResult {
        let mut result = ImportBatchResult {
            total_processed: pending.len(),
            ..ImportBatchResult::default()
        };

        for project in &pending {
            match self.commit_one(project) {
                Ok(CommitOutcome::Inserted(code)) => {
                    result.succeeded += 1;
                    result.inserted_codes.push(code);
                }
                Ok(CommitOutcome::Duplicate) => result.skipped += 1,
                Err(err) => {
                    warn!(
                        "event=import_insert module=import status=error code={} error={}",
                        project.code, err
                    );
                    result.failed += 1;
                    result
                        .errors
                        .push(format!("Project '{}': {err}", project.draft.title));
                }
            }
        }

        result
    }

    fn commit_one(&self, project: &PendingProject) -> RepoResult<CommitOutcome> {
        let draft = &project.draft;
        if self
            .detector
            .is_duplicate(&draft.title, draft.start_date, draft.end_date)?
        {
            return Ok(CommitOutcome::Duplicate);
        }

        let stored = self.repo.insert_project(project)?;
        Ok(CommitOutcome::Inserted(stored.code))
    }
}
