//! Resolution of a session into the rights it actually holds.

use crate::model::sector::SectorId;
use crate::model::session::{Actor, Session};
use crate::repo::admin_repo::AdminRepository;
use crate::service::error::ServiceError;

/// Rights held by a session after checking the admin directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// Directory-confirmed admin, valid for every sector.
    Admin { email: String },
    /// Caretaker bound to one sector.
    Caretaker { sector_id: SectorId },
}

impl Authority {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    pub fn covers_sector(&self, sector_id: SectorId) -> bool {
        match self {
            Self::Admin { .. } => true,
            Self::Caretaker {
                sector_id: own_sector,
            } => *own_sector == sector_id,
        }
    }
}

/// Resolves `session`, rejecting admin claims absent from the directory.
pub fn resolve_authority<A: AdminRepository>(
    admins: &A,
    session: &Session,
) -> Result<Authority, ServiceError> {
    match &session.actor {
        Actor::Admin { email, .. } => {
            if admins.is_admin_email(email)? {
                Ok(Authority::Admin {
                    email: email.clone(),
                })
            } else {
                Err(ServiceError::NotAuthorized(
                    "email is not in the admin directory",
                ))
            }
        }
        Actor::Caretaker { sector_id, .. } => Ok(Authority::Caretaker {
            sector_id: *sector_id,
        }),
    }
}

/// Requires directory-confirmed admin rights.
pub fn require_admin<A: AdminRepository>(
    admins: &A,
    session: &Session,
) -> Result<Authority, ServiceError> {
    let authority = resolve_authority(admins, session)?;
    if !authority.is_admin() {
        return Err(ServiceError::NotAuthorized("admin rights required"));
    }
    Ok(authority)
}

/// Requires rights over `sector_id`, admin-only when `admin_only` is set.
pub fn require_sector<A: AdminRepository>(
    admins: &A,
    session: &Session,
    sector_id: SectorId,
    admin_only: bool,
) -> Result<Authority, ServiceError> {
    let authority = resolve_authority(admins, session)?;
    if admin_only && !authority.is_admin() {
        return Err(ServiceError::NotAuthorized("admin rights required"));
    }
    if !authority.covers_sector(sector_id) {
        return Err(ServiceError::NotAuthorized(
            "caretakers may only act on their own sector",
        ));
    }
    Ok(authority)
}
