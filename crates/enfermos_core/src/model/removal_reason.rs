//! Removal reason chosen when a caretaker asks to remove a dependent.
//!
//! # Invariants
//! - Preset reasons are stored verbatim, without length checks.
//! - The "other" category needs at least `OTHER_REASON_MIN_CHARS` characters
//!   after trim + upper-case and is stored as `OUTRO: <TEXT>`.

use crate::model::normalize_upper;
use crate::model::validation::ValidationError;

/// Category label that unlocks the free-text field.
pub const OTHER_CATEGORY_LABEL: &str = "Outro";
/// Minimum characters for free-text reasons.
pub const OTHER_REASON_MIN_CHARS: usize = 4;

const OTHER_STORED_PREFIX: &str = "OUTRO";

/// Fixed reasons offered by the removal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetReason {
    Deceased,
    MovedAway,
    Recovered,
    Hospitalized,
}

impl PresetReason {
    const ALL: [Self; 4] = [
        Self::Deceased,
        Self::MovedAway,
        Self::Recovered,
        Self::Hospitalized,
    ];

    pub fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Form label, also the stored reason text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Deceased => "Falecimento",
            Self::MovedAway => "Mudou-se",
            Self::Recovered => "Recuperado",
            Self::Hospitalized => "Internado",
        }
    }

    fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.label() == value)
    }
}

/// Validated removal reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    Preset(PresetReason),
    /// Normalized (trimmed, upper-cased) free text.
    Other(String),
}

impl RemovalReason {
    /// Validates a free-text reason.
    pub fn other(text: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_upper(text);
        let actual = normalized.chars().count();
        if actual < OTHER_REASON_MIN_CHARS {
            return Err(ValidationError::RemovalReasonTooShort {
                min_chars: OTHER_REASON_MIN_CHARS,
                actual,
            });
        }
        Ok(Self::Other(normalized))
    }

    /// Builds a reason from the form's category select and free-text field.
    ///
    /// `other_text` is only read when `category` is `"Outro"`.
    pub fn from_form(category: &str, other_text: Option<&str>) -> Result<Self, ValidationError> {
        let category = category.trim();
        if category == OTHER_CATEGORY_LABEL {
            return Self::other(other_text.unwrap_or_default());
        }
        PresetReason::from_label(category)
            .map(Self::Preset)
            .ok_or_else(|| ValidationError::UnknownRemovalCategory(category.to_string()))
    }

    /// Text persisted as the record's pending reason.
    pub fn stored_text(&self) -> String {
        match self {
            Self::Preset(preset) => preset.label().to_string(),
            Self::Other(text) => format!("{OTHER_STORED_PREFIX}: {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PresetReason, RemovalReason};
    use crate::model::validation::ValidationError;

    #[test]
    fn other_with_two_chars_is_rejected() {
        let err = RemovalReason::from_form("Outro", Some(" ok ")).expect_err("too short");
        assert_eq!(
            err,
            ValidationError::RemovalReasonTooShort {
                min_chars: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn other_with_four_chars_is_prefixed_and_uppercased() {
        let reason = RemovalReason::from_form("Outro", Some("sick")).expect("valid reason");
        assert_eq!(reason.stored_text(), "OUTRO: SICK");
    }

    #[test]
    fn other_without_text_is_rejected() {
        assert!(RemovalReason::from_form("Outro", None).is_err());
    }

    #[test]
    fn presets_are_stored_verbatim_and_ignore_free_text() {
        let reason = RemovalReason::from_form("Mudou-se", Some("x")).expect("preset reason");
        assert_eq!(reason, RemovalReason::Preset(PresetReason::MovedAway));
        assert_eq!(reason.stored_text(), "Mudou-se");
        assert_eq!(PresetReason::all().len(), 4);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(
            RemovalReason::from_form("Cansado", None),
            Err(ValidationError::UnknownRemovalCategory("Cansado".to_string()))
        );
    }
}
