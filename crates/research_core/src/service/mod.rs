//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and import-pipeline calls into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod import_service;
pub mod project_service;
pub mod status_service;
