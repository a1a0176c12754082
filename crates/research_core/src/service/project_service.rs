//! Manual project entry and read access.
//!
//! # Responsibility
//! - Validate single-entry drafts against entry limits.
//! - Allocate one code, insert and record the initial status change.
//!
//! # Invariants
//! - Every issue is collected; entry never stops at the first one.
//! - Entry only creates projects in `Active`.
//! - Undated drafts are filed under the current year, not `0000`.

use crate::import::allocator::IdentifierAllocator;
use crate::model::code::{ProjectCode, YearBucket};
use crate::model::project::{ProjectDraft, StoredProject};
use crate::model::status::can_transition;
use crate::normalize::VALID_CURRENCY_CODES;
use crate::repo::project_repo::{ProjectRepository, RepoError, RepoResult};
use crate::service::status_service::InvalidTransition;
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const INVESTIGATOR_MIN_CHARS: usize = 2;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const TEAM_MEMBERS_MAX_CHARS: usize = 1000;
pub const FUNDING_SOURCE_MAX_CHARS: usize = 200;
pub const LABEL_MAX_CHARS: usize = 100;
pub const BUDGET_MAX: f64 = 10_000_000_000.0;
const START_YEARS_BACK: i32 = 50;
const START_YEARS_AHEAD: i32 = 10;
const END_YEARS_AHEAD: i32 = 20;
const MAX_DURATION_DAYS: i64 = 15 * 365;

/// One rejected entry field.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryIssue {
    TitleRequired,
    TitleLength(usize),
    InvestigatorRequired,
    InvestigatorTooShort,
    StartYearOutOfRange(i32),
    EndYearOutOfRange(i32),
    EndBeforeStart,
    DurationTooLong(i64),
    NegativeBudget,
    BudgetTooLarge,
    UnknownCurrency(String),
    FieldTooLong { field: &'static str, max: usize },
    TitleTaken(String),
}

impl Display for EntryIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "project title is required"),
            Self::TitleLength(len) => write!(
                f,
                "project title must be {TITLE_MIN_CHARS}..={TITLE_MAX_CHARS} characters, got {len}"
            ),
            Self::InvestigatorRequired => write!(f, "principal investigator is required"),
            Self::InvestigatorTooShort => write!(
                f,
                "principal investigator must be at least {INVESTIGATOR_MIN_CHARS} characters"
            ),
            Self::StartYearOutOfRange(year) => write!(
                f,
                "start year {year} must be within {START_YEARS_BACK} years back and {START_YEARS_AHEAD} years ahead"
            ),
            Self::EndYearOutOfRange(year) => write!(
                f,
                "end year {year} cannot be more than {END_YEARS_AHEAD} years in the future"
            ),
            Self::EndBeforeStart => write!(f, "end date cannot be earlier than start date"),
            Self::DurationTooLong(days) => {
                write!(f, "project duration of {days} days exceeds 15 years")
            }
            Self::NegativeBudget => write!(f, "budget cannot be negative"),
            Self::BudgetTooLarge => write!(f, "budget cannot exceed 10 billion"),
            Self::UnknownCurrency(code) => write!(
                f,
                "invalid currency `{code}`; must be one of: {}",
                VALID_CURRENCY_CODES.join(", ")
            ),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} cannot exceed {max} characters")
            }
            Self::TitleTaken(title) => {
                write!(f, "a project titled `{title}` already exists")
            }
        }
    }
}

/// Service error for project entry use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Entry fields failed validation; all issues are listed.
    InvalidEntry(Vec<EntryIssue>),
    InvalidTransition(InvalidTransition),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntry(issues) => {
                let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
                write!(f, "invalid project entry: {}", messages.join("; "))
            }
            Self::InvalidTransition(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTransition(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidEntry(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<InvalidTransition> for ProjectServiceError {
    fn from(value: InvalidTransition) -> Self {
        Self::InvalidTransition(value)
    }
}

/// Checks entry limits that do not need the store.
///
/// Title uniqueness is checked by `ProjectService::create_project`.
pub fn validate_entry(draft: &ProjectDraft, today: NaiveDate) -> Vec<EntryIssue> {
    let mut issues = Vec::new();

    let title_len = draft.title.trim().chars().count();
    if title_len == 0 {
        issues.push(EntryIssue::TitleRequired);
    } else if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        issues.push(EntryIssue::TitleLength(title_len));
    }

    let investigator_len = draft.principal_investigator.trim().chars().count();
    if investigator_len == 0 {
        issues.push(EntryIssue::InvestigatorRequired);
    } else if investigator_len < INVESTIGATOR_MIN_CHARS {
        issues.push(EntryIssue::InvestigatorTooShort);
    }

    let this_year = today.year();
    if let Some(start) = draft.start_date {
        let year = start.year();
        if year < this_year - START_YEARS_BACK || year > this_year + START_YEARS_AHEAD {
            issues.push(EntryIssue::StartYearOutOfRange(year));
        }
    }
    if let Some(end) = draft.end_date {
        if end.year() > this_year + END_YEARS_AHEAD {
            issues.push(EntryIssue::EndYearOutOfRange(end.year()));
        }
    }
    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
        if end < start {
            issues.push(EntryIssue::EndBeforeStart);
        }
        let duration = (end - start).num_days();
        if duration > MAX_DURATION_DAYS {
            issues.push(EntryIssue::DurationTooLong(duration));
        }
    }

    if let Some(amount) = draft.budget_amount {
        if !amount.is_finite() || amount < 0.0 {
            issues.push(EntryIssue::NegativeBudget);
        } else if amount > BUDGET_MAX {
            issues.push(EntryIssue::BudgetTooLarge);
        }
    }

    if !VALID_CURRENCY_CODES.contains(&draft.currency_code.as_str()) {
        issues.push(EntryIssue::UnknownCurrency(draft.currency_code.clone()));
    }

    let text_limits: [(&'static str, Option<&str>, usize); 5] = [
        (
            "description",
            draft.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        ),
        (
            "team members",
            Some(draft.team_members.as_str()),
            TEAM_MEMBERS_MAX_CHARS,
        ),
        (
            "funding source",
            Some(draft.funding_source.as_str()),
            FUNDING_SOURCE_MAX_CHARS,
        ),
        ("category", draft.category.as_deref(), LABEL_MAX_CHARS),
        ("theme", draft.theme.as_deref(), LABEL_MAX_CHARS),
    ];
    for (field, value, max) in text_limits {
        if value.is_some_and(|value| value.trim().chars().count() > max) {
            issues.push(EntryIssue::FieldTooLong { field, max });
        }
    }

    issues
}

/// Use-case service for single project entry and lookup.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one project from a manually entered draft.
    ///
    /// # Contract
    /// - Returns `InvalidEntry` listing every failed field, title clash
    ///   included.
    /// - Rejects any status other than `Active`.
    /// - Writes the project and an initial `StatusChange` with
    ///   `from_status = None` in one store transaction.
    pub fn create_project(
        &self,
        draft: ProjectDraft,
        actor: &str,
        today: NaiveDate,
    ) -> Result<StoredProject, ProjectServiceError> {
        let mut issues = validate_entry(&draft, today);
        let title = draft.title.trim();
        if !title.is_empty() && !self.repo.find_by_title(title)?.is_empty() {
            issues.push(EntryIssue::TitleTaken(title.to_string()));
        }
        if !issues.is_empty() {
            warn!(
                "event=project_create module=entry status=rejected issues={}",
                issues.len()
            );
            return Err(ProjectServiceError::InvalidEntry(issues));
        }

        if !can_transition(None, draft.status) {
            return Err(InvalidTransition {
                from: None,
                to: draft.status,
            }
            .into());
        }

        let allocator = IdentifierAllocator::new(&self.repo);
        let pending = allocator.allocate_one(draft, YearBucket::Year(today.year()))?;
        let (stored, _initial) = self.repo.insert_project_with_initial_change(&pending, actor)?;

        info!(
            "event=project_create module=entry status=ok code={}",
            stored.code
        );
        Ok(stored)
    }

    pub fn get_project(&self, code: &ProjectCode) -> RepoResult<Option<StoredProject>> {
        self.repo.get_project(code)
    }

    /// All stored projects ordered by code.
    pub fn list_projects(&self) -> RepoResult<Vec<StoredProject>> {
        self.repo.list_projects()
    }

    pub fn count_projects(&self) -> RepoResult<u64> {
        self.repo.count_projects()
    }
}
