//! Workflow configuration passed explicitly to services.

/// How caretaker-created dependents enter the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditionPolicy {
    /// Created `active` immediately.
    #[default]
    Direct,
    /// Created `pending_addition`; an admin must approve.
    RequiresApproval,
}

impl AdditionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::RequiresApproval => "approval",
        }
    }

    /// Parses `direct` or `approval` (case-insensitive).
    ///
    /// # Errors
    /// - Returns a human-readable message for any other value.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "approval" | "requires_approval" => Ok(Self::RequiresApproval),
            other => Err(format!(
                "unsupported addition policy `{other}`; expected direct|approval"
            )),
        }
    }
}

/// Options for `WorkflowService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkflowConfig {
    pub addition_policy: AdditionPolicy,
}
