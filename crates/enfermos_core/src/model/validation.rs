//! Validation errors shared by model constructors and store write paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input or persisted-state rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyAddress,
    AgeOutOfRange(u32),
    EmptyRemovalReason,
    RemovalReasonTooShort { min_chars: usize, actual: usize },
    UnknownRemovalCategory(String),
    EmptySectorName,
    EmptyCaretakerName,
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::EmptyAddress => write!(f, "address must not be blank"),
            Self::AgeOutOfRange(age) => write!(f, "age {age} is out of range"),
            Self::EmptyRemovalReason => write!(f, "removal reason must not be blank"),
            Self::RemovalReasonTooShort { min_chars, actual } => write!(
                f,
                "custom removal reason needs at least {min_chars} characters, got {actual}"
            ),
            Self::UnknownRemovalCategory(value) => {
                write!(f, "unknown removal reason category: `{value}`")
            }
            Self::EmptySectorName => write!(f, "sector name must not be blank"),
            Self::EmptyCaretakerName => write!(f, "caretaker name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
        }
    }
}

impl Error for ValidationError {}
