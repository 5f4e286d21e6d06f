//! Resource - Identity and reconcile contract of a declarative resource

use std::fmt;

use crate::differ::FieldDiff;
use crate::validation::ValidationError;

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "privateca.certificate_authority")
    pub resource_type: String,
    /// Relative resource name (e.g., "projects/p/locations/l/caPools/c/certificateAuthorities/ca")
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.resource_type, self.name)
    }
}

/// A resource whose desired state can be reconciled against observed state.
///
/// Implementations supply the per-resource pieces (validation, canonicalization
/// and field comparison); the generic driver in [`crate::apply`] sequences them.
pub trait Resource: Clone + fmt::Debug + Send + Sync + 'static {
    /// Resource type name used in identifiers and messages
    const RESOURCE_TYPE: &'static str;

    /// Identity of this resource
    fn id(&self) -> ResourceId;

    /// Check required fields and field-group constraints
    fn validate(&self) -> Result<(), ValidationError>;

    /// Normalize a user-supplied desired state against the observed state.
    ///
    /// `initial` is `None` when the resource does not exist yet.
    fn canonicalize_desired(&self, initial: Option<&Self>) -> Self;

    /// Normalize a freshly read state against the desired state it was applied from.
    fn canonicalize_new(&self, desired: &Self) -> Self;

    /// Compare `self` (desired) with `actual` field by field
    fn diff(&self, actual: &Self) -> Vec<FieldDiff>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_display() {
        let id = ResourceId::new("privateca.certificate_authority", "projects/p/x");
        assert_eq!(
            id.to_string(),
            "privateca.certificate_authority \"projects/p/x\""
        );
    }
}
