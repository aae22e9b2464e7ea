//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate authorization, validation, the state machine and store calls
//!   into use-case level APIs.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Every privileged call re-checks the session against the admin directory.
//! - Services remain storage-agnostic; they only see repository traits.

pub mod access_service;
pub mod authority;
pub mod error;
pub mod sector_service;
pub mod workflow_service;
