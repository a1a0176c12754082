//! Project store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup/insert APIs over canonical `projects` storage.
//! - Persist append-only status history alongside status updates.
//!
//! # Invariants
//! - Write paths call `ProjectDraft::validate()` before SQL mutations.
//! - Each insert and each status change is its own transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::code::ProjectCode;
use crate::model::project::{PendingProject, ProjectDraft, ProjectValidationError, StoredProject};
use crate::model::status::ProjectStatus;
use crate::model::status_change::StatusChange;
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    code,
    title,
    principal_investigator,
    description,
    category,
    theme,
    start_date,
    end_date,
    status,
    team_members,
    funding_source,
    budget_amount,
    currency_code,
    created_at,
    updated_at
FROM projects";

const STATUS_CHANGE_SELECT_SQL: &str = "SELECT
    change_uuid,
    project_code,
    actor,
    from_status,
    to_status,
    reason,
    changed_at
FROM project_status_changes";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    /// Store unavailable or SQL failure.
    Db(DbError),
    NotFound(ProjectCode),
    /// Insert collided with an existing project code.
    DuplicateCode(ProjectCode),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(code) => write!(f, "project not found: {code}"),
            Self::DuplicateCode(code) => write!(f, "project code already exists: {code}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "project repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "project repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Project store used by import, entry and status workflows.
pub trait ProjectRepository {
    /// Projects whose stored title equals `title` exactly.
    fn find_by_title(&self, title: &str) -> RepoResult<Vec<StoredProject>>;
    /// Projects whose code starts with `prefix` (e.g. `PROJ-2024-`).
    fn find_by_code_prefix(&self, prefix: &str) -> RepoResult<Vec<StoredProject>>;
    /// Inserts one project; fails with `DuplicateCode` on code collision.
    fn insert_project(&self, pending: &PendingProject) -> RepoResult<StoredProject>;
    /// Inserts one project and its creation history record in one
    /// transaction; neither is written when either insert fails.
    fn insert_project_with_initial_change(
        &self,
        pending: &PendingProject,
        actor: &str,
    ) -> RepoResult<(StoredProject, StatusChange)>;
    fn get_project(&self, code: &ProjectCode) -> RepoResult<Option<StoredProject>>;
    fn count_projects(&self) -> RepoResult<u64>;
    /// All projects ordered by code.
    fn list_projects(&self) -> RepoResult<Vec<StoredProject>>;
    /// Persists a status transition and its history record atomically.
    fn apply_status_change(&self, change: &StatusChange) -> RepoResult<()>;
    /// History for one project, newest first.
    fn list_status_changes(&self, code: &ProjectCode) -> RepoResult<Vec<StatusChange>>;
}

/// SQLite-backed project store.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_project_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_projects(&self, sql: &str, param: &str) -> RepoResult<Vec<StoredProject>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([param])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn find_by_title(&self, title: &str) -> RepoResult<Vec<StoredProject>> {
        self.query_projects(
            &format!("{PROJECT_SELECT_SQL} WHERE title = ?1 ORDER BY code ASC;"),
            title,
        )
    }

    fn find_by_code_prefix(&self, prefix: &str) -> RepoResult<Vec<StoredProject>> {
        // substr comparison avoids LIKE wildcard handling for `_` and `%`.
        self.query_projects(
            &format!(
                "{PROJECT_SELECT_SQL}
                 WHERE substr(code, 1, length(?1)) = ?1
                 ORDER BY code ASC;"
            ),
            prefix,
        )
    }

    fn insert_project(&self, pending: &PendingProject) -> RepoResult<StoredProject> {
        pending.draft.validate()?;
        let now = crate::model::now_epoch_ms();

        let tx = self.conn.unchecked_transaction()?;
        insert_project_row(&tx, pending, now)?;
        tx.commit()?;

        Ok(stored_from_pending(pending, now))
    }

    fn insert_project_with_initial_change(
        &self,
        pending: &PendingProject,
        actor: &str,
    ) -> RepoResult<(StoredProject, StatusChange)> {
        pending.draft.validate()?;
        let now = crate::model::now_epoch_ms();
        let initial = StatusChange::new(
            pending.code.clone(),
            actor,
            None,
            pending.draft.status,
            None,
            now,
        );

        let tx = self.conn.unchecked_transaction()?;
        insert_project_row(&tx, pending, now)?;
        insert_status_change(&tx, &initial)?;
        tx.commit()?;

        Ok((stored_from_pending(pending, now), initial))
    }

    fn get_project(&self, code: &ProjectCode) -> RepoResult<Option<StoredProject>> {
        let mut found = self.query_projects(
            &format!("{PROJECT_SELECT_SQL} WHERE code = ?1;"),
            code.as_str(),
        )?;
        Ok(found.pop())
    }

    fn count_projects(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative project count `{count}`")))
    }

    fn list_projects(&self) -> RepoResult<Vec<StoredProject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY code ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn apply_status_change(&self, change: &StatusChange) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE projects
             SET
                status = ?1,
                updated_at = ?2
             WHERE code = ?3;",
            params![
                change.to_status.label(),
                change.changed_at,
                change.project_code.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(change.project_code.clone()));
        }

        insert_status_change(&tx, change)?;
        tx.commit()?;
        Ok(())
    }

    fn list_status_changes(&self, code: &ProjectCode) -> RepoResult<Vec<StatusChange>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STATUS_CHANGE_SELECT_SQL}
             WHERE project_code = ?1
             ORDER BY changed_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([code.as_str()])?;
        let mut changes = Vec::new();
        while let Some(row) = rows.next()? {
            changes.push(parse_status_change_row(row)?);
        }
        Ok(changes)
    }
}

fn insert_project_row(conn: &Connection, pending: &PendingProject, now: i64) -> RepoResult<()> {
    let draft = &pending.draft;
    let inserted = conn.execute(
        "INSERT INTO projects (
            code,
            title,
            principal_investigator,
            description,
            category,
            theme,
            start_date,
            end_date,
            status,
            team_members,
            funding_source,
            budget_amount,
            currency_code,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14);",
        params![
            pending.code.as_str(),
            draft.title.as_str(),
            draft.principal_investigator.as_str(),
            draft.description.as_deref(),
            draft.category.as_deref(),
            draft.theme.as_deref(),
            draft.start_date.map(date_to_db),
            draft.end_date.map(date_to_db),
            draft.status.label(),
            draft.team_members.as_str(),
            draft.funding_source.as_str(),
            draft.budget_amount,
            draft.currency_code.as_str(),
            now,
        ],
    );

    match inserted {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(RepoError::DuplicateCode(pending.code.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

fn stored_from_pending(pending: &PendingProject, now: i64) -> StoredProject {
    StoredProject {
        code: pending.code.clone(),
        fields: pending.draft.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn insert_status_change(conn: &Connection, change: &StatusChange) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO project_status_changes (
            change_uuid,
            project_code,
            actor,
            from_status,
            to_status,
            reason,
            changed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            change.change_id.to_string(),
            change.project_code.as_str(),
            change.actor.as_str(),
            change.from_status.map(ProjectStatus::label),
            change.to_status.label(),
            change.reason.as_deref(),
            change.changed_at,
        ],
    )?;
    Ok(())
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<StoredProject> {
    let code = ProjectCode::from_stored(row.get::<_, String>("code")?);
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text, "projects.status")?;

    let fields = ProjectDraft {
        title: row.get("title")?,
        principal_investigator: row.get("principal_investigator")?,
        description: row.get("description")?,
        category: row.get("category")?,
        theme: row.get("theme")?,
        start_date: parse_optional_date(row, "start_date")?,
        end_date: parse_optional_date(row, "end_date")?,
        status,
        team_members: row.get("team_members")?,
        funding_source: row.get("funding_source")?,
        budget_amount: row.get("budget_amount")?,
        currency_code: row.get("currency_code")?,
    };
    fields.validate().map_err(|err| {
        RepoError::InvalidData(format!("project `{code}` violates draft invariants: {err}"))
    })?;

    Ok(StoredProject {
        code,
        fields,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_status_change_row(row: &Row<'_>) -> RepoResult<StatusChange> {
    let uuid_text: String = row.get("change_uuid")?;
    let change_id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in project_status_changes.change_uuid"
        ))
    })?;

    let from_status = match row.get::<_, Option<String>>("from_status")? {
        Some(value) => Some(parse_status(&value, "project_status_changes.from_status")?),
        None => None,
    };
    let to_text: String = row.get("to_status")?;

    Ok(StatusChange {
        change_id,
        project_code: ProjectCode::from_stored(row.get::<_, String>("project_code")?),
        actor: row.get("actor")?,
        from_status,
        to_status: parse_status(&to_text, "project_status_changes.to_status")?,
        reason: row.get("reason")?,
        changed_at: row.get("changed_at")?,
    })
}

fn parse_status(value: &str, column: &str) -> RepoResult<ProjectStatus> {
    value
        .parse::<ProjectStatus>()
        .map_err(|_| RepoError::InvalidData(format!("invalid status `{value}` in {column}")))
}

fn parse_optional_date(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in projects.{column}"))
            }),
        None => Ok(None),
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::ConstraintViolation
                && (inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
    )
}

fn ensure_project_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["projects", "project_status_changes"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
