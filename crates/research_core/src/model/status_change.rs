//! Append-only status history record.

use crate::model::code::ProjectCode;
use crate::model::status::ProjectStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One accepted status transition.
///
/// `from_status` is `None` only for the initial record written when a
/// project is created through the entry flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub change_id: Uuid,
    pub project_code: ProjectCode,
    /// Opaque reference to whoever requested the change.
    pub actor: String,
    pub from_status: Option<ProjectStatus>,
    pub to_status: ProjectStatus,
    pub reason: Option<String>,
    /// Unix epoch milliseconds.
    pub changed_at: i64,
}

impl StatusChange {
    pub fn new(
        project_code: ProjectCode,
        actor: impl Into<String>,
        from_status: Option<ProjectStatus>,
        to_status: ProjectStatus,
        reason: Option<String>,
        changed_at: i64,
    ) -> Self {
        Self {
            change_id: Uuid::new_v4(),
            project_code,
            actor: actor.into(),
            from_status,
            to_status,
            reason: reason
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            changed_at,
        }
    }
}
