//! Core domain logic for the research project registry.
//! Spreadsheet batch import, project entry and the status workflow live here.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod service;
pub mod source;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use import::committer::ImportBatchResult;
pub use import::ImportOptions;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::code::{ProjectCode, YearBucket};
pub use model::project::{PendingProject, ProjectDraft, ProjectValidationError, StoredProject};
pub use model::status::ProjectStatus;
pub use model::status_change::StatusChange;
pub use repo::project_repo::{ProjectRepository, RepoError, RepoResult, SqliteProjectRepository};
pub use service::import_service::{ImportError, ImportPreview, ImportService};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::status_service::{InvalidTransition, StatusService, StatusServiceError};
pub use source::{CellValue, InMemoryTable, SourceRow, TabularSource};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
