//! Header resolution from uploaded spellings to canonical fields.
//!
//! # Invariants
//! - Matching is case-insensitive on trimmed header text.
//! - Fields resolve independently; one header may serve several fields.
//! - Missing `Title` or `PrincipalInvestigator` rejects the whole batch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Semantic project attribute fed by one spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Title,
    PrincipalInvestigator,
    Description,
    Category,
    Theme,
    Status,
    StartDate,
    EndDate,
    TeamMembers,
    FundingSource,
    Budget,
    Currency,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 12] = [
        CanonicalField::Title,
        CanonicalField::PrincipalInvestigator,
        CanonicalField::Description,
        CanonicalField::Category,
        CanonicalField::Theme,
        CanonicalField::Status,
        CanonicalField::StartDate,
        CanonicalField::EndDate,
        CanonicalField::TeamMembers,
        CanonicalField::FundingSource,
        CanonicalField::Budget,
        CanonicalField::Currency,
    ];

    /// Accepted header spellings in priority order (lowercase).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Title => &["title", "project title", "name", "project name"],
            Self::PrincipalInvestigator => &[
                "principal investigator",
                "pi",
                "lead",
                "principal_investigator",
            ],
            Self::Description => &["description", "desc", "summary", "abstract"],
            Self::Category => &["category", "project category", "type", "field"],
            Self::Theme => &["theme", "project theme", "subject", "topic"],
            Self::Status => &["status", "project status", "state"],
            Self::StartDate => &["start date", "start_date", "begin date", "commencement"],
            Self::EndDate => &["end date", "end_date", "finish date", "completion"],
            Self::TeamMembers => &["team members", "team_members", "team", "members"],
            Self::FundingSource => &["funding source", "funding_source", "funder", "sponsor"],
            Self::Budget => &["budget", "amount", "funding amount"],
            Self::Currency => &["currency", "curr", "money type"],
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::Title | Self::PrincipalInvestigator)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::PrincipalInvestigator => "Principal Investigator",
            Self::Description => "Description",
            Self::Category => "Category",
            Self::Theme => "Theme",
            Self::Status => "Status",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
            Self::TeamMembers => "Team Members",
            Self::FundingSource => "Funding Source",
            Self::Budget => "Budget",
            Self::Currency => "Currency",
        }
    }
}

/// Batch-wide rejection: required columns absent from the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumnsError {
    pub missing: Vec<CanonicalField>,
}

impl Display for MissingColumnsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let described: Vec<String> = self
            .missing
            .iter()
            .map(|field| {
                format!(
                    "'{}' (or similar: {})",
                    field.label(),
                    field.aliases().join(", ")
                )
            })
            .collect();
        write!(f, "missing required column: {}", described.join("; "))
    }
}

impl Error for MissingColumnsError {}

/// Canonical field to uploaded header mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    resolved: BTreeMap<CanonicalField, String>,
}

impl ColumnMap {
    /// Uploaded header text for `field`, if resolved.
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.resolved.get(&field).map(String::as_str)
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.resolved.contains_key(&field)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

/// Resolves uploaded headers against the alias table.
///
/// For each field, aliases are tried in priority order and the first
/// uploaded header matching one of them wins.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<ColumnMap, MissingColumnsError> {
    let normalized: Vec<(String, &str)> = headers
        .iter()
        .map(|header| (header.as_ref().trim().to_lowercase(), header.as_ref()))
        .collect();

    let mut resolved = BTreeMap::new();
    for field in CanonicalField::ALL {
        let matched = field.aliases().iter().find_map(|alias| {
            normalized
                .iter()
                .find(|(lowered, _)| lowered == alias)
                .map(|(_, original)| (*original).to_string())
        });
        if let Some(header) = matched {
            resolved.insert(field, header);
        }
    }

    let missing: Vec<CanonicalField> = CanonicalField::ALL
        .into_iter()
        .filter(|field| field.is_required() && !resolved.contains_key(field))
        .collect();
    if !missing.is_empty() {
        return Err(MissingColumnsError { missing });
    }

    Ok(ColumnMap { resolved })
}

#[cfg(test)]
mod tests {
    use super::{resolve_columns, CanonicalField};

    #[test]
    fn alias_priority_beats_header_order() {
        let map = resolve_columns(&["Project Name", "Title", "PI"]).unwrap();
        assert_eq!(map.header(CanonicalField::Title), Some("Title"));
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let map = resolve_columns(&["title", "lead", "colour"]).unwrap();
        assert_eq!(map.resolved_count(), 2);
    }
}
