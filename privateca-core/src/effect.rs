//! Effect - A single API operation a Plan will perform

use std::fmt;

/// Operation needed to move a resource toward its desired state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create the resource from the desired state
    Create,
    /// Change mutable fields in place
    Update {
        /// Name of the update operation (e.g., "UpdateCertificateAuthority")
        operation: String,
        /// Top-level fields sent in the update mask, in snake_case
        update_mask: Vec<String>,
    },
    /// Delete the resource
    Delete,
}

impl Effect {
    /// Short symbol used in plan output
    pub fn symbol(&self) -> &'static str {
        match self {
            Effect::Create => "+",
            Effect::Update { .. } => "~",
            Effect::Delete => "-",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Create => write!(f, "create"),
            Effect::Update {
                operation,
                update_mask,
            } => write!(f, "update via {} ({})", operation, update_mask.join(",")),
            Effect::Delete => write!(f, "delete"),
        }
    }
}
