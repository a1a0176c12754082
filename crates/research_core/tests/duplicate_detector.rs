use chrono::NaiveDate;
use research_core::import::duplicate::DuplicateDetector;
use research_core::{
    open_db_in_memory, PendingProject, ProjectCode, ProjectDraft, ProjectRepository,
    SqliteProjectRepository,
};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn store(
    repo: &SqliteProjectRepository<'_>,
    code: &str,
    title: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) {
    let mut draft = ProjectDraft::new(title, "Dr. Perera");
    draft.start_date = start_date;
    draft.end_date = end_date;
    repo.insert_project(&PendingProject {
        code: ProjectCode::from_stored(code),
        draft,
    })
    .unwrap();
}

#[test]
fn nineteen_day_gap_is_a_duplicate_and_fifty_nine_is_not() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    store(&repo, "PROJ-2024-001", "Soil Health", date(2024, 1, 1), date(2024, 12, 31));
    let detector = DuplicateDetector::new(&repo);

    assert!(detector
        .is_duplicate("Soil Health", date(2024, 1, 20), date(2024, 12, 31))
        .unwrap());
    assert!(!detector
        .is_duplicate("Soil Health", date(2024, 2, 29), date(2024, 12, 31))
        .unwrap());
}

#[test]
fn both_axes_must_be_near() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    store(&repo, "PROJ-2024-001", "Soil Health", date(2024, 1, 1), date(2024, 12, 31));
    let detector = DuplicateDetector::new(&repo);

    assert!(!detector
        .is_duplicate("Soil Health", date(2024, 1, 1), date(2025, 6, 30))
        .unwrap());
}

#[test]
fn missing_dates_only_match_missing_dates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    store(&repo, "PROJ-0000-001", "Coastal Survey", None, None);
    store(&repo, "PROJ-2024-001", "Reef Census", date(2024, 3, 1), None);
    let detector = DuplicateDetector::new(&repo);

    assert!(detector.is_duplicate("Coastal Survey", None, None).unwrap());
    assert!(!detector
        .is_duplicate("Coastal Survey", date(2024, 1, 1), None)
        .unwrap());
    assert!(detector
        .is_duplicate("Reef Census", date(2024, 3, 10), None)
        .unwrap());
    assert!(!detector.is_duplicate("Reef Census", None, None).unwrap());
}

#[test]
fn title_match_is_exact_after_trimming() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    store(&repo, "PROJ-2024-001", "Soil Health", date(2024, 1, 1), None);
    let detector = DuplicateDetector::new(&repo);

    assert!(detector
        .is_duplicate("  Soil Health ", date(2024, 1, 1), None)
        .unwrap());
    assert!(!detector
        .is_duplicate("soil health", date(2024, 1, 1), None)
        .unwrap());
    assert!(!detector.is_duplicate("", date(2024, 1, 1), None).unwrap());
}

#[test]
fn custom_window_widens_the_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    store(&repo, "PROJ-2024-001", "Soil Health", date(2024, 1, 1), None);
    let detector = DuplicateDetector::with_window(&repo, 90);

    assert!(detector
        .is_duplicate("Soil Health", date(2024, 3, 1), None)
        .unwrap());
}
