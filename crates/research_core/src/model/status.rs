//! Project lifecycle status and its transition table.
//!
//! # Invariants
//! - `Completed` and `Cancelled` are terminal.
//! - New projects may only start as `Active`.
//! - Same-state transitions are not allowed.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    /// Human-facing label, also used as the persisted value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_transitions(self) -> &'static [ProjectStatus] {
        match self {
            Self::Active => &[Self::OnHold, Self::Completed, Self::Cancelled],
            Self::OnHold => &[Self::Active, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Returns whether `from -> to` is allowed.
///
/// `from = None` is the creation case: only `Active` is accepted.
pub fn can_transition(from: Option<ProjectStatus>, to: ProjectStatus) -> bool {
    match from {
        None => to == ProjectStatus::Active,
        Some(current) => current.allowed_transitions().contains(&to),
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for labels that are not one of the four canonical statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown status `{}`; expected Active|On Hold|Completed|Cancelled",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    /// Strict parse of canonical labels. Free-text spreadsheet values go
    /// through `normalize::status::normalize_status` instead.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{can_transition, ProjectStatus};

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(ProjectStatus::Completed.is_terminal());
        assert!(ProjectStatus::Cancelled.is_terminal());
        assert!(!ProjectStatus::Active.is_terminal());
        assert!(!ProjectStatus::OnHold.is_terminal());
    }

    #[test]
    fn creation_only_accepts_active() {
        assert!(can_transition(None, ProjectStatus::Active));
        assert!(!can_transition(None, ProjectStatus::OnHold));
        assert!(!can_transition(None, ProjectStatus::Completed));
        assert!(!can_transition(None, ProjectStatus::Cancelled));
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.label().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("on hold".parse::<ProjectStatus>().is_err());
    }
}
