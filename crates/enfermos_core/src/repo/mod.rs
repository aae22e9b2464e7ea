//! Document-store contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for dependents, sectors
//!   and admins.
//! - Isolate SQL details from the workflow and services.
//!
//! # Invariants
//! - Write paths validate records before touching storage.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Dependent writes are conditional on the status the caller observed;
//!   a vanished row is `NotFound`, a changed row is `StatusMismatch`.

use crate::db::DbError;
use crate::model::dependent::{DependentId, DependentStatus};
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod admin_repo;
pub mod dependent_repo;
pub mod sector_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every store contract.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    /// Conditional write lost: the row no longer has the expected status.
    StatusMismatch {
        id: DependentId,
        expected: DependentStatus,
        actual: DependentStatus,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::StatusMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "dependent {id} changed concurrently: expected `{}`, found `{}`",
                expected.as_str(),
                actual.as_str()
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::StatusMismatch { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
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

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
