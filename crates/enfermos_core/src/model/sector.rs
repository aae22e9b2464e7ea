//! Sector ("setor") and caretaker ("responsável") model.
//!
//! # Responsibility
//! - Define sectors and their ordered caretaker list.
//! - Decode both stored caretaker shapes and normalize them on read.
//!
//! # Invariants
//! - Stored caretaker lists may mix bare names (legacy) and `{name, phone}`
//!   objects; in memory every entry is a `Caretaker`.
//! - Writes always use the object shape.
//! - Dependent counts are derived at read time and never stored.

use crate::display::{format_phone, phone_digits};
use crate::model::normalize_upper;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a sector.
pub type SectorId = Uuid;

/// Person allowed to propose changes for one sector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caretaker {
    pub name: String,
    /// `None` for entries migrated from the bare-name format.
    pub phone: Option<String>,
}

impl Caretaker {
    /// Builds a caretaker from form input: name upper-cased, phone masked.
    pub fn new(name: &str, phone: Option<&str>) -> Self {
        Self {
            name: normalize_upper(name),
            phone: phone
                .map(format_phone)
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyCaretakerName);
        }
        Ok(())
    }

    /// Whether this entry came from the bare-name format.
    pub fn is_legacy(&self) -> bool {
        self.phone.is_none()
    }

    /// Matches login input: name case-insensitively, phone by digits only.
    ///
    /// Legacy entries never match since they carry no phone.
    pub fn matches_login(&self, name: &str, phone: &str) -> bool {
        let Some(stored_phone) = self.phone.as_deref() else {
            return false;
        };
        let wanted_digits = phone_digits(phone);
        !wanted_digits.is_empty()
            && self.name == normalize_upper(name)
            && phone_digits(stored_phone) == wanted_digits
    }
}

/// Caretaker entry as found in storage.
///
/// The object shape accepts the Portuguese keys (`nome`, `telefone`) written
/// by older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaretakerEntry {
    Contact {
        #[serde(alias = "nome")]
        name: String,
        #[serde(default, alias = "telefone")]
        phone: Option<String>,
    },
    Legacy(String),
}

impl From<CaretakerEntry> for Caretaker {
    fn from(value: CaretakerEntry) -> Self {
        match value {
            CaretakerEntry::Contact { name, phone } => Self {
                name: normalize_upper(&name),
                phone: phone
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty()),
            },
            CaretakerEntry::Legacy(name) => Self {
                name: normalize_upper(&name),
                phone: None,
            },
        }
    }
}

impl From<&Caretaker> for CaretakerEntry {
    fn from(value: &Caretaker) -> Self {
        Self::Contact {
            name: value.name.clone(),
            phone: value.phone.clone(),
        }
    }
}

/// Decodes a stored caretaker list, accepting both entry shapes.
pub fn decode_caretakers(json: &str) -> Result<Vec<Caretaker>, serde_json::Error> {
    let entries: Vec<CaretakerEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(Caretaker::from).collect())
}

/// Encodes a caretaker list in the object shape.
pub fn encode_caretakers(caretakers: &[Caretaker]) -> Result<String, serde_json::Error> {
    let entries = caretakers
        .iter()
        .map(CaretakerEntry::from)
        .collect::<Vec<_>>();
    serde_json::to_string(&entries)
}

/// Organizational grouping owning dependents and caretakers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    /// Free-form visiting schedule, e.g. `"SÁBADOS 9H"`.
    pub schedule: String,
    pub caretakers: Vec<Caretaker>,
}

impl Sector {
    /// Creates a sector with a generated id and no caretakers.
    pub fn new(name: &str, schedule: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: normalize_upper(name),
            schedule: schedule.trim().to_string(),
            caretakers: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptySectorName);
        }
        self.caretakers.iter().try_for_each(Caretaker::validate)
    }
}

/// Sector plus counts derived from its dependents at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: Sector,
    pub total_dependents: u32,
    /// Dependents in any non-active status.
    pub pending_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{decode_caretakers, encode_caretakers, Caretaker, Sector};
    use crate::model::validation::ValidationError;

    #[test]
    fn decodes_mixed_legacy_and_contact_entries() {
        let json = r#"[
            "joão",
            {"nome": "MARIA", "telefone": "(11) 98765-4321"},
            {"name": "pedro", "phone": null}
        ]"#;
        let caretakers = decode_caretakers(json).expect("mixed list should decode");

        assert_eq!(
            caretakers,
            vec![
                Caretaker {
                    name: "JOÃO".to_string(),
                    phone: None,
                },
                Caretaker {
                    name: "MARIA".to_string(),
                    phone: Some("(11) 98765-4321".to_string()),
                },
                Caretaker {
                    name: "PEDRO".to_string(),
                    phone: None,
                },
            ]
        );
        assert!(caretakers[0].is_legacy());
        assert!(!caretakers[1].is_legacy());
    }

    #[test]
    fn encoding_always_writes_object_shape() {
        let caretakers = decode_caretakers(r#"["ANA"]"#).expect("legacy list should decode");
        let json = encode_caretakers(&caretakers).expect("encode should succeed");
        assert_eq!(json, r#"[{"name":"ANA","phone":null}]"#);
    }

    #[test]
    fn new_caretaker_masks_phone_and_uppercases_name() {
        let caretaker = Caretaker::new(" ana lima ", Some("11987654321"));
        assert_eq!(caretaker.name, "ANA LIMA");
        assert_eq!(caretaker.phone.as_deref(), Some("(11) 98765-4321"));

        let without_phone = Caretaker::new("ANA", Some("  "));
        assert!(without_phone.is_legacy());
    }

    #[test]
    fn login_match_requires_phone_digits() {
        let caretaker = Caretaker::new("ANA LIMA", Some("(11) 98765-4321"));
        assert!(caretaker.matches_login("ana lima", "11987654321"));
        assert!(!caretaker.matches_login("ana lima", "11900000000"));
        assert!(!caretaker.matches_login("ana", "11987654321"));

        let legacy = Caretaker::new("ANA LIMA", None);
        assert!(!legacy.matches_login("ANA LIMA", ""));
    }

    #[test]
    fn sector_validation_checks_name_and_caretakers() {
        assert_eq!(
            Sector::new("  ", "").validate(),
            Err(ValidationError::EmptySectorName)
        );

        let mut sector = Sector::new("setor norte", "sábados 9h");
        assert_eq!(sector.name, "SETOR NORTE");
        sector.caretakers.push(Caretaker::new(" ", None));
        assert_eq!(sector.validate(), Err(ValidationError::EmptyCaretakerName));
    }
}
