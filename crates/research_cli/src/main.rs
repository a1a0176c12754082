//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `research_core` linkage with deterministic output.
//! - With a database path argument, open (and migrate) the store and print
//!   the stored project count.

use research_core::{open_db, ProjectRepository, SqliteProjectRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("research_core ping={}", research_core::ping());
    println!("research_core version={}", research_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match project_count(&db_path) {
        Ok(count) => {
            println!("research_core projects={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("research_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn project_count(db_path: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let repo = SqliteProjectRepository::try_new(&conn)?;
    Ok(repo.count_projects()?)
}
