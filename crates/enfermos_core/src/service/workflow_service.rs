//! Pending-change workflow use-case service.
//!
//! # Responsibility
//! - Gate each dependent transition on the session's authority.
//! - Run the pure state machine and persist its outcome in one conditional
//!   store write.
//!
//! # Invariants
//! - Guards run in a fixed order: authority, payload, lookup, pending guard,
//!   transition legality, write. A caretaker firing an admin-only event is
//!   rejected before the record is even read.
//! - Caretakers never move a record out of a pending state.
//! - A failed call writes nothing.
//! - Name and address reach the store trimmed and upper-cased.

use crate::config::{AdditionPolicy, WorkflowConfig};
use crate::model::dependent::{Dependent, DependentFields, DependentId};
use crate::model::removal_reason::RemovalReason;
use crate::model::sector::SectorId;
use crate::model::session::Session;
use crate::model::validation::ValidationError;
use crate::repo::admin_repo::AdminRepository;
use crate::repo::dependent_repo::{DependentRepository, PendingItem};
use crate::service::authority::{require_admin, require_sector};
use crate::service::error::ServiceError;
use crate::workflow::{apply_transition, TransitionEvent, TransitionOutcome};
use log::{info, warn};

/// Final effect of a resolved transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Record kept, as stored after the write.
    Updated(Dependent),
    /// Record deleted.
    Deleted(DependentId),
}

/// Use-case service for dependents and their pending changes.
pub struct WorkflowService<D: DependentRepository, A: AdminRepository> {
    dependents: D,
    admins: A,
    config: WorkflowConfig,
}

impl<D: DependentRepository, A: AdminRepository> WorkflowService<D, A> {
    /// Creates a service with the default configuration.
    pub fn new(dependents: D, admins: A) -> Self {
        Self::with_config(dependents, admins, WorkflowConfig::default())
    }

    pub fn with_config(dependents: D, admins: A, config: WorkflowConfig) -> Self {
        Self {
            dependents,
            admins,
            config,
        }
    }

    pub fn config(&self) -> WorkflowConfig {
        self.config
    }

    /// Registers a new dependent in `sector_id`.
    ///
    /// Admins always create active records; caretakers create active or
    /// `pending_addition` records depending on `AdditionPolicy`.
    pub fn add_dependent(
        &self,
        session: &Session,
        sector_id: SectorId,
        fields: DependentFields,
    ) -> Result<Dependent, ServiceError> {
        let authority = require_sector(&self.admins, session, sector_id, false)?;
        let fields = fields.normalized();
        fields.validate()?;

        let needs_approval = !authority.is_admin()
            && self.config.addition_policy == AdditionPolicy::RequiresApproval;
        let record = if needs_approval {
            Dependent::new_pending_addition(sector_id, fields)
        } else {
            Dependent::new_active(sector_id, fields)
        };

        self.dependents.create_dependent(&record)?;
        let stored = self
            .dependents
            .get_dependent(sector_id, record.id)?
            .ok_or(ServiceError::InconsistentState(
                "created dependent not found in read-back",
            ))?;

        info!(
            "event=dependent_add module=workflow status=ok sector_id={sector_id} dependent_id={} result_status={}",
            stored.id,
            stored.status().as_str()
        );
        Ok(stored)
    }

    /// Asks for removal; the record becomes `pending_removal`.
    pub fn request_removal(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
        reason: &RemovalReason,
    ) -> Result<Dependent, ServiceError> {
        let event = TransitionEvent::RequestRemoval {
            reason: reason.stored_text(),
        };
        expect_updated(self.transition(session, sector_id, id, event)?)
    }

    /// Proposes a full replacement field set; the record becomes `pending_edit`.
    pub fn request_edit(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
        proposed: DependentFields,
    ) -> Result<Dependent, ServiceError> {
        let event = TransitionEvent::RequestEdit {
            proposed: proposed.normalized(),
        };
        expect_updated(self.transition(session, sector_id, id, event)?)
    }

    /// Admin-only immediate edit of an active record.
    pub fn direct_edit(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
        fields: DependentFields,
    ) -> Result<Dependent, ServiceError> {
        let event = TransitionEvent::DirectEdit {
            fields: fields.normalized(),
        };
        expect_updated(self.transition(session, sector_id, id, event)?)
    }

    /// Admin-only immediate removal of an active record.
    pub fn direct_removal(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
    ) -> Result<(), ServiceError> {
        self.transition(session, sector_id, id, TransitionEvent::DirectRemoval)
            .map(|_| ())
    }

    /// Admin-only acceptance of the pending change.
    pub fn approve(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
    ) -> Result<Resolution, ServiceError> {
        self.transition(session, sector_id, id, TransitionEvent::Approve)
    }

    /// Admin-only refusal of the pending change.
    pub fn reject(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
    ) -> Result<Resolution, ServiceError> {
        self.transition(session, sector_id, id, TransitionEvent::Reject)
    }

    /// Lists one sector's dependents by name. Readable without a session.
    pub fn list_dependents(&self, sector_id: SectorId) -> Result<Vec<Dependent>, ServiceError> {
        Ok(self.dependents.list_dependents(sector_id)?)
    }

    /// Admin-only pending queue, across all sectors or for one.
    pub fn list_pending(
        &self,
        session: &Session,
        sector_id: Option<SectorId>,
    ) -> Result<Vec<PendingItem>, ServiceError> {
        require_admin(&self.admins, session)?;
        Ok(self.dependents.list_pending(sector_id)?)
    }

    fn transition(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
        event: TransitionEvent,
    ) -> Result<Resolution, ServiceError> {
        let action = event.name();
        match self.try_transition(session, sector_id, id, event) {
            Ok(resolution) => {
                let result_status = match &resolution {
                    Resolution::Updated(record) => record.status().as_str(),
                    Resolution::Deleted(_) => "deleted",
                };
                info!(
                    "event=dependent_transition module=workflow status=ok action={action} sector_id={sector_id} dependent_id={id} result_status={result_status}"
                );
                Ok(resolution)
            }
            Err(err) => {
                warn!(
                    "event=dependent_transition module=workflow status=error action={action} sector_id={sector_id} dependent_id={id} error_kind={}",
                    err.kind()
                );
                Err(err)
            }
        }
    }

    fn try_transition(
        &self,
        session: &Session,
        sector_id: SectorId,
        id: DependentId,
        event: TransitionEvent,
    ) -> Result<Resolution, ServiceError> {
        let authority = require_sector(&self.admins, session, sector_id, event.is_admin_only())?;
        validate_event_payload(&event)?;

        let record = self
            .dependents
            .get_dependent(sector_id, id)?
            .ok_or(ServiceError::NotFound {
                entity: "dependent",
                id,
            })?;

        if !authority.is_admin() && record.is_pending() {
            return Err(ServiceError::NotAuthorized(
                "record is awaiting admin resolution",
            ));
        }

        let expected = record.status();
        match apply_transition(&record, event)? {
            TransitionOutcome::Update(next) => {
                self.dependents.replace_dependent(&next, expected)?;
                let stored = self.dependents.get_dependent(sector_id, id)?.ok_or(
                    ServiceError::NotFound {
                        entity: "dependent",
                        id,
                    },
                )?;
                Ok(Resolution::Updated(stored))
            }
            TransitionOutcome::Delete => {
                self.dependents.delete_dependent(sector_id, id, expected)?;
                Ok(Resolution::Deleted(id))
            }
        }
    }
}

fn validate_event_payload(event: &TransitionEvent) -> Result<(), ValidationError> {
    match event {
        TransitionEvent::RequestRemoval { reason } if reason.trim().is_empty() => {
            Err(ValidationError::EmptyRemovalReason)
        }
        TransitionEvent::RequestEdit { proposed } => proposed.validate(),
        TransitionEvent::DirectEdit { fields } => fields.validate(),
        _ => Ok(()),
    }
}

fn expect_updated(resolution: Resolution) -> Result<Dependent, ServiceError> {
    match resolution {
        Resolution::Updated(record) => Ok(record),
        Resolution::Deleted(_) => Err(ServiceError::InconsistentState(
            "update transition deleted the record",
        )),
    }
}
