//! privateca Core
//!
//! Resource-agnostic reconcile primitives: desired state is validated,
//! canonicalized against observed state, diffed field by field, and turned
//! into a Plan of Effects that a Provider executes.

pub mod apply;
pub mod canonical;
pub mod differ;
pub mod effect;
pub mod field;
pub mod lifecycle;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod validation;

pub use apply::{Reconciliation, apply, apply_reconciliation, delete, reconcile};
pub use differ::{DiffInfo, Differ, FieldDiff, FieldPath, OperationSelector};
pub use effect::Effect;
pub use field::Field;
pub use lifecycle::{ApplyOptions, LifecycleParam};
pub use plan::{Plan, PlanSummary};
pub use provider::{BoxFuture, Provider, ProviderError, ProviderResult};
pub use resource::{Resource, ResourceId};
pub use validation::{Validate, ValidationError, Validator};
