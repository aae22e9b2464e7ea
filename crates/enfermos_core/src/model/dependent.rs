//! Dependent ("enfermo") domain model.
//!
//! # Responsibility
//! - Define the dependent record and its status/payload state.
//! - Validate editable fields before they reach the store.
//!
//! # Invariants
//! - `DependentState::PendingRemoval` is the only state carrying a reason.
//! - `DependentState::PendingEdit` is the only state carrying a proposed
//!   field set, and that set is a full replacement, not a patch.
//! - `pending_since` is `Some` only while the record is pending.

use crate::model::normalize_upper;
use crate::model::sector::SectorId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a dependent record.
pub type DependentId = Uuid;

/// Upper bound accepted for `age`.
pub const MAX_AGE: u32 = 150;

/// Editable fields of a dependent; also the shape of a pending edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentFields {
    pub name: String,
    pub address: String,
    /// Legacy records were created without an age.
    pub age: Option<u32>,
}

impl DependentFields {
    /// Builds a field set from raw form input, trimming and upper-casing text.
    pub fn new(name: &str, address: &str, age: Option<u32>) -> Self {
        Self {
            name: normalize_upper(name),
            address: normalize_upper(address),
            age,
        }
    }

    /// Applies the same trim + upper-case as `new` to a field set built
    /// elsewhere.
    pub fn normalized(self) -> Self {
        Self::new(&self.name, &self.address, self.age)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        if let Some(age) = self.age {
            if age > MAX_AGE {
                return Err(ValidationError::AgeOutOfRange(age));
            }
        }
        Ok(())
    }
}

/// Flat status label, as stored and as filtered by pending queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentStatus {
    Active,
    PendingRemoval,
    PendingEdit,
    PendingAddition,
}

impl DependentStatus {
    /// Every status awaiting admin resolution.
    pub const PENDING: [Self; 3] = [
        Self::PendingRemoval,
        Self::PendingEdit,
        Self::PendingAddition,
    ];

    pub fn is_pending(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingRemoval => "pending_removal",
            Self::PendingEdit => "pending_edit",
            Self::PendingAddition => "pending_addition",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "pending_removal" => Some(Self::PendingRemoval),
            "pending_edit" => Some(Self::PendingEdit),
            "pending_addition" => Some(Self::PendingAddition),
            _ => None,
        }
    }
}

/// Status together with the payload that status requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DependentState {
    Active,
    PendingRemoval { reason: String },
    PendingEdit { proposed: DependentFields },
    PendingAddition,
}

impl DependentState {
    pub fn status(&self) -> DependentStatus {
        match self {
            Self::Active => DependentStatus::Active,
            Self::PendingRemoval { .. } => DependentStatus::PendingRemoval,
            Self::PendingEdit { .. } => DependentStatus::PendingEdit,
            Self::PendingAddition => DependentStatus::PendingAddition,
        }
    }
}

/// Dependent record owned by one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub id: DependentId,
    pub sector_id: SectorId,
    /// Effective values. A pending edit does not touch these until approved.
    pub fields: DependentFields,
    pub state: DependentState,
    /// Epoch milliseconds, stamped by the store on insert.
    pub created_at: Option<i64>,
    /// Epoch milliseconds, stamped by the store when a pending state starts.
    pub pending_since: Option<i64>,
}

impl Dependent {
    /// Creates an active dependent with a generated id.
    pub fn new_active(sector_id: SectorId, fields: DependentFields) -> Self {
        Self::with_state(sector_id, fields, DependentState::Active)
    }

    /// Creates a dependent that only becomes visible as active after approval.
    pub fn new_pending_addition(sector_id: SectorId, fields: DependentFields) -> Self {
        Self::with_state(sector_id, fields, DependentState::PendingAddition)
    }

    fn with_state(sector_id: SectorId, fields: DependentFields, state: DependentState) -> Self {
        Self {
            id: Uuid::new_v4(),
            sector_id,
            fields,
            state,
            created_at: None,
            pending_since: None,
        }
    }

    pub fn status(&self) -> DependentStatus {
        self.state.status()
    }

    pub fn is_pending(&self) -> bool {
        self.status().is_pending()
    }

    /// Reason text, present only while removal is pending.
    pub fn removal_reason(&self) -> Option<&str> {
        match &self.state {
            DependentState::PendingRemoval { reason } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Proposed replacement, present only while an edit is pending.
    pub fn pending_edit(&self) -> Option<&DependentFields> {
        match &self.state {
            DependentState::PendingEdit { proposed } => Some(proposed),
            _ => None,
        }
    }

    /// Checks effective fields and the pending payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()?;
        match &self.state {
            DependentState::PendingRemoval { reason } if reason.trim().is_empty() => {
                Err(ValidationError::EmptyRemovalReason)
            }
            DependentState::PendingEdit { proposed } => proposed.validate(),
            _ => Ok(()),
        }
    }
}
