//! Title + date-proximity duplicate detection against stored projects.
//!
//! # Invariants
//! - Titles match exactly after trimming.
//! - An axis (start, end) is similar when both dates are present and within
//!   the window, or when both are absent. One-sided presence is dissimilar.
//! - A candidate is a duplicate when both axes are similar for at least one
//!   stored project.

use crate::import::DEFAULT_PROXIMITY_DAYS;
use crate::model::project::StoredProject;
use crate::repo::project_repo::{ProjectRepository, RepoResult};
use chrono::NaiveDate;

/// Duplicate detector bound to one project store.
pub struct DuplicateDetector<'repo, R: ?Sized> {
    repo: &'repo R,
    proximity_days: i64,
}

impl<'repo, R: ProjectRepository + ?Sized> DuplicateDetector<'repo, R> {
    /// Creates a detector with the default 30-day window.
    pub fn new(repo: &'repo R) -> Self {
        Self::with_window(repo, DEFAULT_PROXIMITY_DAYS)
    }

    pub fn with_window(repo: &'repo R, proximity_days: i64) -> Self {
        Self {
            repo,
            proximity_days,
        }
    }

    /// Returns whether a stored project already matches this candidate.
    ///
    /// Store read failures propagate.
    pub fn is_duplicate(
        &self,
        title: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> RepoResult<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let existing = self.repo.find_by_title(title)?;
        Ok(existing.iter().any(|project| {
            is_near_match(start_date, end_date, project, self.proximity_days)
        }))
    }
}

/// Compares candidate dates with one stored project on both axes.
pub fn is_near_match(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    existing: &StoredProject,
    proximity_days: i64,
) -> bool {
    axis_similar(start_date, existing.fields.start_date, proximity_days)
        && axis_similar(end_date, existing.fields.end_date, proximity_days)
}

fn axis_similar(left: Option<NaiveDate>, right: Option<NaiveDate>, proximity_days: i64) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => (left - right).num_days().abs() <= proximity_days,
        (None, None) => true,
        _ => false,
    }
}
