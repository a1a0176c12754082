//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the project store contract consumed by import and workflow
//!   services.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Repository writes enforce `ProjectDraft::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateCode`) in
//!   addition to DB transport errors.

pub mod project_repo;
