//! Domain model for research project records.
//!
//! # Responsibility
//! - Define canonical project shapes shared by import and entry flows.
//! - Own the project status state machine and identifier format.
//!
//! # Invariants
//! - A draft has no identifier; a stored project always has one.
//! - Status changes are append-only records.

pub mod code;
pub mod project;
pub mod status;
pub mod status_change;

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
