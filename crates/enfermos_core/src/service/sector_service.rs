//! Sector and caretaker management service.
//!
//! # Responsibility
//! - Expose sector reads with derived dependent counts.
//! - Gate sector creation and caretaker list edits on admin rights.
//!
//! # Invariants
//! - A sector's caretaker list holds no duplicates.
//! - Caretaker edits rewrite the whole list in one store write.

use crate::model::sector::{Caretaker, Sector, SectorId, SectorSummary};
use crate::model::session::Session;
use crate::repo::admin_repo::AdminRepository;
use crate::repo::sector_repo::SectorRepository;
use crate::service::authority::require_admin;
use crate::service::error::ServiceError;
use log::info;

/// Use-case service for sectors.
pub struct SectorService<S: SectorRepository, A: AdminRepository> {
    sectors: S,
    admins: A,
}

impl<S: SectorRepository, A: AdminRepository> SectorService<S, A> {
    pub fn new(sectors: S, admins: A) -> Self {
        Self { sectors, admins }
    }

    /// Lists all sectors by name with dependent and pending counts.
    pub fn list_sectors(&self) -> Result<Vec<SectorSummary>, ServiceError> {
        Ok(self.sectors.list_sectors()?)
    }

    pub fn get_sector(&self, id: SectorId) -> Result<Sector, ServiceError> {
        self.load(id)
    }

    /// Creates an empty sector. Admin only.
    pub fn create_sector(
        &self,
        session: &Session,
        name: &str,
        schedule: &str,
    ) -> Result<Sector, ServiceError> {
        require_admin(&self.admins, session)?;
        let sector = Sector::new(name, schedule);
        sector.validate()?;

        let id = self.sectors.create_sector(&sector)?;
        let stored = self.sectors.get_sector(id)?.ok_or(ServiceError::InconsistentState(
            "created sector not found in read-back",
        ))?;

        info!("event=sector_create module=sectors status=ok sector_id={id}");
        Ok(stored)
    }

    /// Appends a caretaker; an identical entry already present is kept as is.
    pub fn add_caretaker(
        &self,
        session: &Session,
        sector_id: SectorId,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Sector, ServiceError> {
        require_admin(&self.admins, session)?;
        let caretaker = Caretaker::new(name, phone);
        caretaker.validate()?;

        let mut sector = self.load(sector_id)?;
        if sector.caretakers.contains(&caretaker) {
            return Ok(sector);
        }
        sector.caretakers.push(caretaker);
        self.save_caretakers(&sector, "add")
    }

    /// Replaces `old` in place with an entry built from `name` and `phone`.
    pub fn edit_caretaker(
        &self,
        session: &Session,
        sector_id: SectorId,
        old: &Caretaker,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Sector, ServiceError> {
        require_admin(&self.admins, session)?;
        let replacement = Caretaker::new(name, phone);
        replacement.validate()?;

        let mut sector = self.load(sector_id)?;
        let position = position_of(&sector, old)?;
        sector.caretakers[position] = replacement;
        sector.caretakers = dedup_keep_first(sector.caretakers);
        self.save_caretakers(&sector, "edit")
    }

    pub fn remove_caretaker(
        &self,
        session: &Session,
        sector_id: SectorId,
        caretaker: &Caretaker,
    ) -> Result<Sector, ServiceError> {
        require_admin(&self.admins, session)?;

        let mut sector = self.load(sector_id)?;
        let position = position_of(&sector, caretaker)?;
        sector.caretakers.remove(position);
        self.save_caretakers(&sector, "remove")
    }

    fn load(&self, id: SectorId) -> Result<Sector, ServiceError> {
        self.sectors
            .get_sector(id)?
            .ok_or(ServiceError::NotFound {
                entity: "sector",
                id,
            })
    }

    fn save_caretakers(&self, sector: &Sector, action: &str) -> Result<Sector, ServiceError> {
        self.sectors
            .replace_caretakers(sector.id, &sector.caretakers)?;
        let stored = self.load(sector.id)?;
        info!(
            "event=caretaker_update module=sectors status=ok action={action} sector_id={} caretaker_count={}",
            sector.id,
            stored.caretakers.len()
        );
        Ok(stored)
    }
}

fn position_of(sector: &Sector, caretaker: &Caretaker) -> Result<usize, ServiceError> {
    sector
        .caretakers
        .iter()
        .position(|entry| entry == caretaker)
        .ok_or_else(|| ServiceError::CaretakerNotFound(caretaker.name.clone()))
}

fn dedup_keep_first(caretakers: Vec<Caretaker>) -> Vec<Caretaker> {
    let mut unique: Vec<Caretaker> = Vec::with_capacity(caretakers.len());
    for caretaker in caretakers {
        if !unique.contains(&caretaker) {
            unique.push(caretaker);
        }
    }
    unique
}
