//! Project draft and stored project records.
//!
//! # Responsibility
//! - Define the pre-identifier candidate (`ProjectDraft`) and the persisted
//!   record (`StoredProject`).
//! - Provide invariant checks shared by import, entry and repository paths.
//!
//! # Invariants
//! - `title` and `principal_investigator` are trimmed and non-empty.
//! - `end_date` is not earlier than `start_date` when both are set.
//! - `budget_amount` is finite and non-negative when set.

use crate::model::code::{ProjectCode, YearBucket};
use crate::model::status::ProjectStatus;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Currency recorded when neither the budget text nor a currency column
/// names one.
pub const DEFAULT_CURRENCY_CODE: &str = "Rs";

/// Description recorded for imported rows with a blank description cell.
pub const DEFAULT_DESCRIPTION: &str = "Not specified";

/// Invariant violations for project drafts.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectValidationError {
    EmptyTitle,
    EmptyPrincipalInvestigator,
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    InvalidBudget(f64),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::EmptyPrincipalInvestigator => {
                write!(f, "principal investigator must not be blank")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "end_date ({end}) must be >= start_date ({start})")
            }
            Self::InvalidBudget(value) => {
                write!(f, "budget_amount ({value}) must be a non-negative number")
            }
        }
    }
}

impl Error for ProjectValidationError {}

/// In-memory project candidate before identifier assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DraftFields")]
pub struct ProjectDraft {
    pub title: String,
    pub principal_investigator: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub theme: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub team_members: String,
    pub funding_source: String,
    pub budget_amount: Option<f64>,
    pub currency_code: String,
}

impl ProjectDraft {
    /// Creates a draft with trimmed required fields and explicit defaults.
    ///
    /// Does not validate; call `validate()` before persisting.
    pub fn new(title: impl AsRef<str>, principal_investigator: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            principal_investigator: principal_investigator.as_ref().trim().to_string(),
            description: None,
            category: None,
            theme: None,
            start_date: None,
            end_date: None,
            status: ProjectStatus::Active,
            team_members: String::new(),
            funding_source: String::new(),
            budget_amount: None,
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
        }
    }

    /// Checks draft invariants.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.title.trim().is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if self.principal_investigator.trim().is_empty() {
            return Err(ProjectValidationError::EmptyPrincipalInvestigator);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ProjectValidationError::InvalidDateRange { start, end });
            }
        }
        if let Some(amount) = self.budget_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ProjectValidationError::InvalidBudget(amount));
            }
        }
        Ok(())
    }

    /// Year partition used for identifier allocation.
    ///
    /// Start year wins over end year; `None` when the draft is undated.
    pub fn dated_year(&self) -> Option<i32> {
        self.start_date
            .or(self.end_date)
            .map(|date| date.year())
    }

    /// Year bucket with the batch-import fallback (`0000`) for undated drafts.
    pub fn year_bucket(&self) -> YearBucket {
        self.dated_year()
            .map_or(YearBucket::Undated, YearBucket::Year)
    }
}

/// Serde mirror of `ProjectDraft` so deserialization runs `validate()`.
#[derive(Deserialize)]
struct DraftFields {
    title: String,
    principal_investigator: String,
    description: Option<String>,
    category: Option<String>,
    theme: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: ProjectStatus,
    #[serde(default)]
    team_members: String,
    #[serde(default)]
    funding_source: String,
    budget_amount: Option<f64>,
    #[serde(default = "default_currency_code")]
    currency_code: String,
}

fn default_currency_code() -> String {
    DEFAULT_CURRENCY_CODE.to_string()
}

impl TryFrom<DraftFields> for ProjectDraft {
    type Error = ProjectValidationError;

    fn try_from(value: DraftFields) -> Result<Self, Self::Error> {
        let draft = Self {
            title: value.title,
            principal_investigator: value.principal_investigator,
            description: value.description,
            category: value.category,
            theme: value.theme,
            start_date: value.start_date,
            end_date: value.end_date,
            status: value.status,
            team_members: value.team_members,
            funding_source: value.funding_source,
            budget_amount: value.budget_amount,
            currency_code: value.currency_code,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Draft with an allocated identifier, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingProject {
    pub code: ProjectCode,
    pub draft: ProjectDraft,
}

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    pub code: ProjectCode,
    #[serde(flatten)]
    pub fields: ProjectDraft,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Advances on every accepted status change.
    pub updated_at: i64,
}

impl StoredProject {
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn status(&self) -> ProjectStatus {
        self.fields.status
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectDraft, ProjectValidationError};
    use crate::model::code::YearBucket;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_trims_required_fields_and_applies_defaults() {
        let draft = ProjectDraft::new("  Soil survey ", " Dr. Perera ");
        assert_eq!(draft.title, "Soil survey");
        assert_eq!(draft.principal_investigator, "Dr. Perera");
        assert_eq!(draft.currency_code, "Rs");
        assert!(draft.team_members.is_empty());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn year_bucket_prefers_start_then_end() {
        let mut draft = ProjectDraft::new("a", "b");
        assert_eq!(draft.year_bucket(), YearBucket::Undated);

        draft.end_date = Some(date(2025, 3, 1));
        assert_eq!(draft.year_bucket(), YearBucket::Year(2025));

        draft.start_date = Some(date(2023, 3, 1));
        assert_eq!(draft.year_bucket(), YearBucket::Year(2023));
    }

    #[test]
    fn validate_rejects_negative_budget() {
        let mut draft = ProjectDraft::new("a", "b");
        draft.budget_amount = Some(-1.0);
        assert_eq!(
            draft.validate().unwrap_err(),
            ProjectValidationError::InvalidBudget(-1.0)
        );
    }
}
