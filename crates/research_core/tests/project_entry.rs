use chrono::NaiveDate;
use research_core::service::project_service::EntryIssue;
use research_core::{
    open_db_in_memory, ProjectDraft, ProjectRepository, ProjectService, ProjectServiceError,
    ProjectStatus, SqliteProjectRepository,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn dated(title: &str, start: (i32, u32, u32)) -> ProjectDraft {
    let mut draft = ProjectDraft::new(title, "Dr. Perera");
    draft.start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2);
    draft
}

#[test]
fn created_project_gets_next_code_and_initial_history() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let first = service
        .create_project(dated("Soil Health", (2024, 3, 1)), "entry-clerk", today())
        .unwrap();
    let second = service
        .create_project(dated("Reef Census", (2024, 4, 1)), "entry-clerk", today())
        .unwrap();

    assert_eq!(first.code.as_str(), "PROJ-2024-001");
    assert_eq!(second.code.as_str(), "PROJ-2024-002");
    assert_eq!(service.count_projects().unwrap(), 2);

    let history = repo.list_status_changes(&first.code).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_status, None);
    assert_eq!(history[0].to_status, ProjectStatus::Active);
    assert_eq!(history[0].actor, "entry-clerk");
}

#[test]
fn undated_entry_is_filed_under_the_current_year() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let created = service
        .create_project(ProjectDraft::new("Undated Study", "Dr. Silva"), "clerk", today())
        .unwrap();

    assert_eq!(created.code.as_str(), "PROJ-2025-001");
    let loaded = service.get_project(&created.code).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn entry_only_creates_active_projects() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let mut draft = dated("Paused Start", (2024, 1, 1));
    draft.status = ProjectStatus::OnHold;

    let err = service.create_project(draft, "clerk", today()).unwrap_err();
    match err {
        ProjectServiceError::InvalidTransition(transition) => {
            assert_eq!(transition.from, None);
            assert_eq!(transition.to, ProjectStatus::OnHold);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.count_projects().unwrap(), 0);
}

#[test]
fn duplicate_titles_and_field_issues_are_reported_together() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service
        .create_project(dated("Soil Health", (2024, 3, 1)), "clerk", today())
        .unwrap();

    let mut draft = dated("Soil Health", (2024, 3, 1));
    draft.budget_amount = Some(20_000_000_000.0);
    let err = service.create_project(draft, "clerk", today()).unwrap_err();

    match err {
        ProjectServiceError::InvalidEntry(issues) => {
            assert_eq!(
                issues,
                vec![
                    EntryIssue::BudgetTooLarge,
                    EntryIssue::TitleTaken("Soil Health".to_string()),
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.count_projects().unwrap(), 1);
}

#[test]
fn projects_are_listed_by_code() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service
        .create_project(dated("Later", (2025, 1, 1)), "clerk", today())
        .unwrap();
    service
        .create_project(dated("Earlier", (2023, 1, 1)), "clerk", today())
        .unwrap();

    let codes: Vec<String> = service
        .list_projects()
        .unwrap()
        .into_iter()
        .map(|project| project.code.to_string())
        .collect();
    assert_eq!(codes, ["PROJ-2023-001", "PROJ-2025-001"]);
}

#[test]
fn failed_history_write_leaves_no_project_behind() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_history BEFORE INSERT ON project_status_changes
         BEGIN
             SELECT RAISE(ABORT, 'history writes disabled');
         END;",
    )
    .unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let result = service.create_project(dated("Soil Health", (2024, 3, 1)), "entry-clerk", today());

    assert!(matches!(result, Err(ProjectServiceError::Repo(_))));
    assert_eq!(service.count_projects().unwrap(), 0);
    assert!(service.list_projects().unwrap().is_empty());
}
