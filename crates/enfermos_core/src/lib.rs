//! Core domain logic for the sector dependents registry.
//! Dependents ("enfermos") live in sectors; caretakers propose changes and
//! admins approve or reject them. This crate owns those invariants.

pub mod config;
pub mod db;
pub mod display;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod workflow;

pub use config::{AdditionPolicy, WorkflowConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::admin::{Admin, AdminId};
pub use model::dependent::{
    Dependent, DependentFields, DependentId, DependentState, DependentStatus,
};
pub use model::removal_reason::{PresetReason, RemovalReason};
pub use model::sector::{Caretaker, CaretakerEntry, Sector, SectorId, SectorSummary};
pub use model::session::{Actor, Session};
pub use model::validation::ValidationError;
pub use repo::admin_repo::{AdminRepository, AdminUpsert, SqliteAdminRepository};
pub use repo::dependent_repo::{DependentRepository, PendingItem, SqliteDependentRepository};
pub use repo::sector_repo::{SectorRepository, SqliteSectorRepository};
pub use repo::{RepoError, RepoResult};
pub use service::access_service::{AccessService, AdminAuthorization};
pub use service::error::ServiceError;
pub use service::sector_service::SectorService;
pub use service::workflow_service::{Resolution, WorkflowService};
pub use workflow::{apply_transition, TransitionError, TransitionEvent, TransitionOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
