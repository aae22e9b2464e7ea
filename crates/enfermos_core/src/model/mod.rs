//! Domain model for sectors, dependents, admins and sessions.
//!
//! # Responsibility
//! - Define canonical data structures used by the workflow and services.
//! - Normalize user input (trim + upper-case) at construction time.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A dependent's status and its pending payload are one tagged value, so a
//!   pending edit and a removal reason can never coexist.

pub mod admin;
pub mod dependent;
pub mod removal_reason;
pub mod sector;
pub mod session;
pub mod validation;

/// Trims and upper-cases free text the way every input form does.
pub fn normalize_upper(value: &str) -> String {
    value.trim().to_uppercase()
}
