//! Pending-change state machine for dependent records.
//!
//! # Responsibility
//! - Decide, for one record and one event, the record's next value or its
//!   deletion.
//! - Stay free of storage and authorization concerns; `WorkflowService`
//!   layers those on top.
//!
//! # Invariants
//! - Pending states are left only through `Approve` or `Reject`.
//! - An outcome always carries the complete next record, never a patch.
//! - `pending_since` is cleared on every transition back to `Active` and
//!   reset on every transition into a pending state, so the store stamps it.
//! - An approved addition drops `created_at`; the record counts as created
//!   when it was accepted.

use crate::model::dependent::{Dependent, DependentFields, DependentState, DependentStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Event fired against a dependent record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    RequestRemoval { reason: String },
    RequestEdit { proposed: DependentFields },
    DirectEdit { fields: DependentFields },
    DirectRemoval,
    Approve,
    Reject,
}

impl TransitionEvent {
    /// Stable event name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestRemoval { .. } => "request_removal",
            Self::RequestEdit { .. } => "request_edit",
            Self::DirectEdit { .. } => "direct_edit",
            Self::DirectRemoval => "direct_removal",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Whether only admins may fire this event.
    pub fn is_admin_only(&self) -> bool {
        !matches!(self, Self::RequestRemoval { .. } | Self::RequestEdit { .. })
    }
}

/// Result of a legal transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Persist this full record in place of the old one.
    Update(Dependent),
    /// Delete the record.
    Delete,
}

/// `(state, event)` pair with no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DependentStatus,
    pub event: &'static str,
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "event `{}` is not allowed from status `{}`",
            self.event,
            self.from.as_str()
        )
    }
}

impl Error for TransitionError {}

/// Computes the next value of `record` under `event`.
pub fn apply_transition(
    record: &Dependent,
    event: TransitionEvent,
) -> Result<TransitionOutcome, TransitionError> {
    let from = record.status();
    let event_name = event.name();
    let invalid = || TransitionError {
        from,
        event: event_name,
    };

    match (&record.state, event) {
        (DependentState::Active, TransitionEvent::RequestRemoval { reason }) => {
            Ok(updated(record, None, DependentState::PendingRemoval { reason }))
        }
        (DependentState::Active, TransitionEvent::RequestEdit { proposed }) => {
            Ok(updated(record, None, DependentState::PendingEdit { proposed }))
        }
        (DependentState::Active, TransitionEvent::DirectEdit { fields }) => {
            Ok(updated(record, Some(fields), DependentState::Active))
        }
        (DependentState::Active, TransitionEvent::DirectRemoval) => Ok(TransitionOutcome::Delete),

        (DependentState::PendingRemoval { .. }, TransitionEvent::Approve) => {
            Ok(TransitionOutcome::Delete)
        }
        (DependentState::PendingEdit { proposed }, TransitionEvent::Approve) => Ok(updated(
            record,
            Some(proposed.clone()),
            DependentState::Active,
        )),
        (DependentState::PendingAddition, TransitionEvent::Approve) => {
            Ok(TransitionOutcome::Update(Dependent {
                created_at: None,
                ..next_record(record, None, DependentState::Active)
            }))
        }

        (
            DependentState::PendingRemoval { .. } | DependentState::PendingEdit { .. },
            TransitionEvent::Reject,
        ) => Ok(updated(record, None, DependentState::Active)),
        (DependentState::PendingAddition, TransitionEvent::Reject) => {
            Ok(TransitionOutcome::Delete)
        }

        _ => Err(invalid()),
    }
}

fn updated(
    record: &Dependent,
    fields: Option<DependentFields>,
    state: DependentState,
) -> TransitionOutcome {
    TransitionOutcome::Update(next_record(record, fields, state))
}

fn next_record(
    record: &Dependent,
    fields: Option<DependentFields>,
    state: DependentState,
) -> Dependent {
    Dependent {
        id: record.id,
        sector_id: record.sector_id,
        fields: fields.unwrap_or_else(|| record.fields.clone()),
        state,
        created_at: record.created_at,
        pending_since: None,
    }
}
