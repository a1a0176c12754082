use research_core::import::committer::ImportCommitter;
use research_core::import::preflight::BatchWarning;
use research_core::{
    open_db_in_memory, ImportOptions, ImportService, InMemoryTable, PendingProject, ProjectCode,
    ProjectDraft, ProjectRepository, RepoError, SqliteProjectRepository,
};

const HEADERS: [&str; 6] = ["Project Title", "PI", "Status", "Start Date", "End Date", "Budget"];

fn upload() -> InMemoryTable {
    InMemoryTable::from_records(
        &HEADERS,
        vec![
            vec!["Soil Health", "Dr. Perera", "Active", "2024-01-15", "2024-12-31", "Rs 50000"],
            vec!["", "Dr. Nobody", "Active", "2024-02-01", "", ""],
            vec!["Reef Census", "Dr. Silva", "on hold", "2024-03-01", "2025-03-01", "$ 2,000"],
        ],
    )
}

fn dedup_options() -> ImportOptions {
    ImportOptions {
        skip_duplicates: true,
        ..ImportOptions::default()
    }
}

#[test]
fn first_import_inserts_complete_rows_in_order() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let result = service.import(&upload()).unwrap();

    assert_eq!(result.succeeded, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.failed, 0);
    assert_eq!(result.total_processed, 2);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.inserted_codes,
        vec![
            ProjectCode::from_stored("PROJ-2024-001"),
            ProjectCode::from_stored("PROJ-2024-002"),
        ]
    );

    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let reef = repo
        .get_project(&ProjectCode::from_stored("PROJ-2024-002"))
        .unwrap()
        .unwrap();
    assert_eq!(reef.title(), "Reef Census");
    assert_eq!(reef.fields.currency_code, "USD");
    assert_eq!(reef.fields.budget_amount, Some(2000.0));
    assert!(repo.list_status_changes(&reef.code).unwrap().is_empty());
}

#[test]
fn second_pass_with_dedup_inserts_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap())
        .import(&upload())
        .unwrap();

    let service = ImportService::with_options(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        dedup_options(),
    );
    let result = service.import(&upload()).unwrap();

    assert_eq!(result.succeeded, 0);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(repo.count_projects().unwrap(), 2);
}

#[test]
fn commit_time_recheck_skips_duplicates_without_dedup_option() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service.import(&upload()).unwrap();

    let preview = service.preview(&upload()).unwrap();
    assert_eq!(preview.pending.len(), 2);
    assert_eq!(preview.pending[0].code.as_str(), "PROJ-2024-003");

    let result = service.confirm(preview);
    assert_eq!(result.succeeded, 0);
    assert_eq!(result.skipped, 2);
    assert_eq!(repo.count_projects().unwrap(), 2);
}

#[test]
fn preview_does_not_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let preview = service.preview(&upload()).unwrap();

    assert_eq!(preview.pending.len(), 2);
    assert_eq!(preview.incomplete_skipped, 1);
    assert!(preview.warnings.is_empty());
    assert_eq!(repo.count_projects().unwrap(), 0);
}

#[test]
fn row_failures_are_reported_with_commit_results() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let table = InMemoryTable::from_records(
        &HEADERS,
        vec![
            vec!["Backwards", "Dr. Perera", "", "2024-06-01", "2024-01-01", ""],
            vec!["Valid", "Dr. Perera", "", "2024-06-01", "", ""],
        ],
    );

    let result = service.import(&table).unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Project 'Backwards': "));
}

#[test]
fn duplicate_rows_inside_one_upload_are_flagged_but_not_blocked() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let table = InMemoryTable::from_records(
        &HEADERS,
        vec![
            vec!["Soil Health", "Dr. Perera", "", "2024-01-15", "", ""],
            vec!["soil health ", "Dr. Perera", "", "2024-01-20", "", ""],
            vec!["Distinct", "Dr. Perera", "", "2024-01-20", "", ""],
        ],
    );

    let preview = service.preview(&table).unwrap();
    assert_eq!(
        preview.warnings,
        vec![BatchWarning::DuplicateRowsInBatch {
            titles: vec!["Soil Health".to_string()],
        }]
    );
    assert_eq!(preview.pending.len(), 3);
}

#[test]
fn empty_upload_warns_and_commits_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let table = InMemoryTable::from_records(&HEADERS, Vec::<Vec<&str>>::new());

    let preview = service.preview(&table).unwrap();
    assert_eq!(preview.warnings, vec![BatchWarning::EmptyBatch]);

    let result = service.confirm(preview);
    assert_eq!(result.total_processed, 0);
    assert_eq!(result.succeeded, 0);
}

#[test]
fn code_collisions_fail_one_record_and_keep_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    repo.insert_project(&PendingProject {
        code: ProjectCode::from_stored("PROJ-2024-001"),
        draft: ProjectDraft::new("Concurrent Winner", "Dr. Fast"),
    })
    .unwrap();

    let pending = vec![
        PendingProject {
            code: ProjectCode::from_stored("PROJ-2024-001"),
            draft: ProjectDraft::new("Late Loser", "Dr. Slow"),
        },
        PendingProject {
            code: ProjectCode::from_stored("PROJ-2024-002"),
            draft: ProjectDraft::new("Unaffected", "Dr. Slow"),
        },
    ];
    let result = ImportCommitter::new(&repo, 30).commit_batch(pending);

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(
        result.errors,
        vec!["Project 'Late Loser': project code already exists: PROJ-2024-001".to_string()]
    );
    assert_eq!(repo.count_projects().unwrap(), 2);

    let direct = repo.insert_project(&PendingProject {
        code: ProjectCode::from_stored("PROJ-2024-002"),
        draft: ProjectDraft::new("Again", "Dr. Slow"),
    });
    assert!(matches!(direct, Err(RepoError::DuplicateCode(_))));
}
