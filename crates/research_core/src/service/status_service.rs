//! Project status workflow service.
//!
//! # Responsibility
//! - Gate every post-creation status change through the transition table.
//! - Persist accepted changes together with their history record.
//! - Offer date-based status suggestions.
//!
//! # Invariants
//! - A rejected transition mutates nothing and produces no history record.
//! - An accepted transition produces exactly one `StatusChange`.
//! - Concurrent transitions on one project race with last-write-wins.

use crate::model::code::ProjectCode;
use crate::model::now_epoch_ms;
use crate::model::project::StoredProject;
use crate::model::status::{can_transition, ProjectStatus};
use crate::model::status_change::StatusChange;
use crate::repo::project_repo::{ProjectRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    /// `None` for creation.
    pub from: Option<ProjectStatus>,
    pub to: ProjectStatus,
}

impl Display for InvalidTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.from {
            Some(from) => write!(f, "invalid status transition from '{from}' to '{}'", self.to),
            None => write!(f, "new projects cannot start as '{}'", self.to),
        }
    }
}

impl Error for InvalidTransition {}

/// Service error for status use-cases.
#[derive(Debug)]
pub enum StatusServiceError {
    InvalidTransition(InvalidTransition),
    ProjectNotFound(ProjectCode),
    Repo(RepoError),
}

impl Display for StatusServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition(err) => write!(f, "{err}"),
            Self::ProjectNotFound(code) => write!(f, "project not found: {code}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StatusServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTransition(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<InvalidTransition> for StatusServiceError {
    fn from(value: InvalidTransition) -> Self {
        Self::InvalidTransition(value)
    }
}

impl From<RepoError> for StatusServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(code) => Self::ProjectNotFound(code),
            other => Self::Repo(other),
        }
    }
}

/// Applies a status change to an in-memory project.
///
/// # Contract
/// - Disallowed pairs (same-state included) return `InvalidTransition` and
///   leave `project` untouched.
/// - On success `status` and `updated_at` change and the returned
///   `StatusChange` must be persisted by the caller.
pub fn apply_transition(
    project: &mut StoredProject,
    to: ProjectStatus,
    actor: &str,
    reason: Option<String>,
) -> Result<StatusChange, InvalidTransition> {
    let from = project.status();
    if !can_transition(Some(from), to) {
        return Err(InvalidTransition {
            from: Some(from),
            to,
        });
    }

    let changed_at = now_epoch_ms().max(project.updated_at);
    project.fields.status = to;
    project.updated_at = changed_at;
    Ok(StatusChange::new(
        project.code.clone(),
        actor,
        Some(from),
        to,
        reason,
        changed_at,
    ))
}

/// Status checked against project dates.
///
/// Returns `None` when the current status already fits or the project has
/// no start date.
pub fn suggest_status(project: &StoredProject, today: NaiveDate) -> Option<ProjectStatus> {
    let start = project.fields.start_date?;
    if start > today {
        return Some(ProjectStatus::Active);
    }

    let end = project.fields.end_date;
    if end.is_some_and(|end| end < today) && !project.status().is_terminal() {
        return Some(ProjectStatus::Completed);
    }

    let in_window = end.map_or(true, |end| end >= today);
    if in_window && project.status() == ProjectStatus::OnHold {
        return Some(ProjectStatus::Active);
    }

    None
}

/// Use-case service for status transitions and history.
pub struct StatusService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> StatusService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads, gates and persists one transition.
    ///
    /// Status and history are written in one store transaction.
    pub fn change_status(
        &self,
        code: &ProjectCode,
        to: ProjectStatus,
        actor: &str,
        reason: Option<String>,
    ) -> Result<StatusChange, StatusServiceError> {
        let mut project = self
            .repo
            .get_project(code)?
            .ok_or_else(|| StatusServiceError::ProjectNotFound(code.clone()))?;

        let change = match apply_transition(&mut project, to, actor, reason) {
            Ok(change) => change,
            Err(err) => {
                warn!(
                    "event=status_change module=status status=rejected code={} from={:?} to={}",
                    code,
                    err.from.map(ProjectStatus::label),
                    err.to.label()
                );
                return Err(err.into());
            }
        };

        self.repo.apply_status_change(&change)?;
        info!(
            "event=status_change module=status status=ok code={} from={} to={}",
            code,
            change.from_status.map_or("none", ProjectStatus::label),
            change.to_status.label()
        );
        Ok(change)
    }

    /// Status history, newest first.
    pub fn history(&self, code: &ProjectCode) -> RepoResult<Vec<StatusChange>> {
        self.repo.list_status_changes(code)
    }

    /// Suggestion for one stored project; `None` when it is unknown.
    pub fn suggest_for(
        &self,
        code: &ProjectCode,
        today: NaiveDate,
    ) -> RepoResult<Option<ProjectStatus>> {
        Ok(self
            .repo
            .get_project(code)?
            .and_then(|project| suggest_status(&project, today)))
    }
}
