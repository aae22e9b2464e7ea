//! Login and admin directory service.
//!
//! # Responsibility
//! - Turn login input into an explicit `Session`.
//! - Manage the admin directory behind admin-only guards.
//!
//! # Invariants
//! - Caretaker login needs a phone; bare-name caretaker entries never log in.
//! - Admin login only checks directory membership. Credentials are verified
//!   by the identity provider before this call.

use crate::model::admin::{normalize_email, Admin};
use crate::model::session::Session;
use crate::repo::admin_repo::{AdminRepository, AdminUpsert};
use crate::repo::sector_repo::SectorRepository;
use crate::service::authority::{require_admin, resolve_authority};
use crate::service::error::ServiceError;
use log::{info, warn};

/// Outcome of `AccessService::authorize_admin`.
pub type AdminAuthorization = AdminUpsert;

/// Use-case service for login and admin management.
pub struct AccessService<S: SectorRepository, A: AdminRepository> {
    sectors: S,
    admins: A,
}

impl<S: SectorRepository, A: AdminRepository> AccessService<S, A> {
    pub fn new(sectors: S, admins: A) -> Self {
        Self { sectors, admins }
    }

    /// Finds the first sector, by name, listing a caretaker with this name
    /// and phone.
    pub fn login_caretaker(&self, name: &str, phone: &str) -> Result<Session, ServiceError> {
        for summary in self.sectors.list_sectors()? {
            let sector = summary.sector;
            if let Some(caretaker) = sector
                .caretakers
                .iter()
                .find(|entry| entry.matches_login(name, phone))
            {
                info!(
                    "event=login module=access status=ok role=caretaker sector_id={}",
                    sector.id
                );
                return Ok(Session::caretaker(
                    caretaker.name.clone(),
                    caretaker.phone.clone().unwrap_or_default(),
                    sector.id,
                    sector.name.clone(),
                ));
            }
        }

        warn!("event=login module=access status=error role=caretaker error_kind=not_authorized");
        Err(ServiceError::NotAuthorized("caretaker name and phone not found"))
    }

    pub fn login_admin(&self, email: &str) -> Result<Session, ServiceError> {
        let email = normalize_email(email)?;
        match self.admins.find_admin_by_email(&email)? {
            Some(admin) => {
                info!("event=login module=access status=ok role=admin admin_id={}", admin.id);
                Ok(Session::admin(admin.name, admin.email))
            }
            None => {
                warn!("event=login module=access status=error role=admin error_kind=not_authorized");
                Err(ServiceError::NotAuthorized(
                    "email is not in the admin directory",
                ))
            }
        }
    }

    /// Whether the session holds directory-confirmed admin rights.
    pub fn is_admin(&self, session: &Session) -> Result<bool, ServiceError> {
        match resolve_authority(&self.admins, session) {
            Ok(authority) => Ok(authority.is_admin()),
            Err(ServiceError::NotAuthorized(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Adds `email` to the admin directory, or renames its entry. Admin only.
    pub fn authorize_admin(
        &self,
        session: &Session,
        name: &str,
        email: &str,
    ) -> Result<AdminAuthorization, ServiceError> {
        require_admin(&self.admins, session)?;
        let outcome = self.admins.upsert_admin(name, email)?;
        let action = match &outcome {
            AdminUpsert::Created(_) => "created",
            AdminUpsert::Updated(_) => "updated",
        };
        info!(
            "event=admin_authorize module=access status=ok action={action} admin_id={}",
            outcome.admin().id
        );
        Ok(outcome)
    }

    pub fn list_admins(&self, session: &Session) -> Result<Vec<Admin>, ServiceError> {
        require_admin(&self.admins, session)?;
        Ok(self.admins.list_admins()?)
    }
}
