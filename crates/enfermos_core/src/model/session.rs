//! Explicit session value identifying the acting user.
//!
//! Every service call that needs an actor takes a `&Session`; nothing in the
//! core reads a "current user" from ambient storage.

use crate::model::sector::SectorId;
use serde::{Deserialize, Serialize};

/// Who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Scoped to exactly one sector.
    Caretaker {
        name: String,
        phone: String,
        sector_id: SectorId,
        sector_name: String,
    },
    /// Claims admin rights; the claim is re-checked against the admin
    /// directory on every privileged call.
    Admin { name: String, email: String },
}

/// Logged-in user for one call chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub actor: Actor,
}

impl Session {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn caretaker(
        name: impl Into<String>,
        phone: impl Into<String>,
        sector_id: SectorId,
        sector_name: impl Into<String>,
    ) -> Self {
        Self::new(Actor::Caretaker {
            name: name.into(),
            phone: phone.into(),
            sector_id,
            sector_name: sector_name.into(),
        })
    }

    pub fn admin(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(Actor::Admin {
            name: name.into(),
            email: email.into(),
        })
    }

    /// Email of an admin claim, if any.
    pub fn admin_email(&self) -> Option<&str> {
        match &self.actor {
            Actor::Admin { email, .. } => Some(email.as_str()),
            Actor::Caretaker { .. } => None,
        }
    }

    /// Sector of a caretaker session, if any.
    pub fn caretaker_sector(&self) -> Option<SectorId> {
        match &self.actor {
            Actor::Caretaker { sector_id, .. } => Some(*sector_id),
            Actor::Admin { .. } => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match &self.actor {
            Actor::Caretaker { name, .. } | Actor::Admin { name, .. } => name.as_str(),
        }
    }

    /// First word of the display name, as shown on the logout button.
    pub fn first_name(&self) -> &str {
        self.display_name()
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{Actor, Session};
    use uuid::Uuid;

    #[test]
    fn accessors_follow_actor_kind() {
        let sector_id = Uuid::new_v4();
        let caretaker = Session::caretaker("ANA LIMA", "(11) 98765-4321", sector_id, "NORTE");
        assert_eq!(caretaker.caretaker_sector(), Some(sector_id));
        assert_eq!(caretaker.admin_email(), None);
        assert_eq!(caretaker.first_name(), "ANA");

        let admin = Session::admin("PADRE JOÃO", "padre@paroquia.org");
        assert_eq!(admin.admin_email(), Some("padre@paroquia.org"));
        assert_eq!(admin.caretaker_sector(), None);
    }

    #[test]
    fn session_serializes_with_kind_tag() {
        let session = Session::admin("PADRE JOÃO", "padre@paroquia.org");
        let json = serde_json::to_value(&session).expect("session should serialize");
        assert_eq!(json["actor"]["kind"], "admin");

        let back: Session = serde_json::from_value(json).expect("session should deserialize");
        assert!(matches!(back.actor, Actor::Admin { .. }));
    }
}
