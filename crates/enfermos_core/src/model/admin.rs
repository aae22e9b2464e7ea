//! Admin directory model.
//!
//! # Invariants
//! - `email` is stored trimmed and lowercase and is unique in the directory.
//! - Directory membership alone grants admin rights; whether an identity
//!   provider account exists for the email is irrelevant here.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("valid email regex"));

/// Stable identifier of an admin directory entry.
pub type AdminId = Uuid;

/// Authorized administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    /// Upper-cased display name.
    pub name: String,
    pub email: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Normalizes an email for directory lookups.
///
/// # Errors
/// - `ValidationError::InvalidEmail` when the trimmed value is not of the
///   `local@domain` shape.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let normalized = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(normalized)
}
