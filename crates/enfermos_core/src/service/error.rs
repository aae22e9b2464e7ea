//! Error kinds surfaced by every service.

use crate::model::dependent::{DependentId, DependentStatus};
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use crate::workflow::TransitionError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Distinguishable failure of a service call. None are retried.
#[derive(Debug)]
pub enum ServiceError {
    /// Actor lacks permission for the requested action.
    NotAuthorized(&'static str),
    /// Input failed validation.
    InvalidPayload(ValidationError),
    /// Record vanished or never existed.
    NotFound { entity: &'static str, id: Uuid },
    /// Named caretaker is not in the sector's list.
    CaretakerNotFound(String),
    /// Event is not legal from the record's current status.
    InvalidTransition(TransitionError),
    /// Record changed status between read and conditional write.
    Conflict {
        id: DependentId,
        expected: DependentStatus,
        actual: DependentStatus,
    },
    /// Store call failed.
    RemoteFailure(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Stable kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthorized(_) => "not_authorized",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::NotFound { .. } | Self::CaretakerNotFound(_) => "not_found",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Conflict { .. } => "conflict",
            Self::RemoteFailure(_) => "remote_failure",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthorized(reason) => write!(f, "not authorized: {reason}"),
            Self::InvalidPayload(err) => write!(f, "invalid payload: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::CaretakerNotFound(name) => write!(f, "caretaker not found: {name}"),
            Self::InvalidTransition(err) => write!(f, "{err}"),
            Self::Conflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "dependent {id} was resolved concurrently: expected `{}`, found `{}`",
                expected.as_str(),
                actual.as_str()
            ),
            Self::RemoteFailure(err) => write!(f, "store call failed: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPayload(err) => Some(err),
            Self::InvalidTransition(err) => Some(err),
            Self::RemoteFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidPayload(value)
    }
}

impl From<TransitionError> for ServiceError {
    fn from(value: TransitionError) -> Self {
        Self::InvalidTransition(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::StatusMismatch {
                id,
                expected,
                actual,
            } => Self::Conflict {
                id,
                expected,
                actual,
            },
            RepoError::Validation(err) => Self::InvalidPayload(err),
            other => Self::RemoteFailure(other),
        }
    }
}
