//! Lifecycle params - Caller-imposed limits on what apply may do

use crate::effect::Effect;
use crate::plan::Plan;
use crate::provider::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleParam {
    /// Fail instead of creating a missing resource
    BlockCreation,
    /// Fail instead of taking over a resource that already exists
    BlockAcquire,
    /// Fail instead of deleting a resource to recreate it
    BlockDestruction,
    /// Fail instead of updating a resource in place
    BlockModification,
}

/// Options for a single apply
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    lifecycle: Vec<LifecycleParam>,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifecycle_param(mut self, param: LifecycleParam) -> Self {
        if !self.lifecycle.contains(&param) {
            self.lifecycle.push(param);
        }
        self
    }

    pub fn has(&self, param: LifecycleParam) -> bool {
        self.lifecycle.contains(&param)
    }

    /// Reject a plan that conflicts with the lifecycle params
    pub fn check(&self, plan: &Plan) -> ProviderResult<()> {
        let infeasible = |reason: String| ProviderError::ApplyInfeasible {
            id: plan.id().clone(),
            reason,
        };

        if !plan.exists() && self.has(LifecycleParam::BlockCreation) {
            return Err(infeasible(
                "resource does not exist and creation is blocked".to_string(),
            ));
        }

        if plan.exists() && self.has(LifecycleParam::BlockAcquire) {
            return Err(infeasible(
                "resource already exists and acquiring it is blocked".to_string(),
            ));
        }

        if plan.is_recreate() && self.has(LifecycleParam::BlockDestruction) {
            let fields: Vec<String> = plan
                .diffs()
                .iter()
                .filter(|d| d.requires_recreate())
                .map(|d| d.field_name.to_string())
                .collect();
            return Err(infeasible(format!(
                "recreate required by {} but destruction is blocked",
                fields.join(", ")
            )));
        }

        let updates_in_place = plan
            .effects()
            .iter()
            .any(|e| matches!(e, Effect::Update { .. }));
        if updates_in_place && self.has(LifecycleParam::BlockModification) {
            return Err(infeasible(
                "in-place update required but modification is blocked".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::{FieldDiff, FieldPath, OperationSelector};
    use crate::resource::ResourceId;

    fn plan(exists: bool, effects: Vec<Effect>, diffs: Vec<FieldDiff>) -> Plan {
        let mut plan = Plan::new(ResourceId::new("thing", "a"), exists).with_diffs(diffs);
        for e in effects {
            plan.add(e);
        }
        plan
    }

    fn recreate_diff() -> FieldDiff {
        FieldDiff {
            field_name: FieldPath::root().nest("Lifetime"),
            desired: Some("1s".to_string()),
            actual: Some("2s".to_string()),
            operation: OperationSelector::Recreate,
        }
    }

    #[test]
    fn no_params_allows_everything() {
        let options = ApplyOptions::new();
        assert!(options.check(&plan(false, vec![Effect::Create], vec![])).is_ok());
        assert!(
            options
                .check(&plan(
                    true,
                    vec![Effect::Delete, Effect::Create],
                    vec![recreate_diff()]
                ))
                .is_ok()
        );
    }

    #[test]
    fn block_creation() {
        let options = ApplyOptions::new().with_lifecycle_param(LifecycleParam::BlockCreation);
        let err = options
            .check(&plan(false, vec![Effect::Create], vec![]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::ApplyInfeasible { .. }));
        assert!(options.check(&plan(true, vec![], vec![])).is_ok());
    }

    #[test]
    fn block_acquire() {
        let options = ApplyOptions::new().with_lifecycle_param(LifecycleParam::BlockAcquire);
        assert!(options.check(&plan(true, vec![], vec![])).is_err());
        assert!(options.check(&plan(false, vec![Effect::Create], vec![])).is_ok());
    }

    #[test]
    fn block_destruction_names_fields() {
        let options = ApplyOptions::new().with_lifecycle_param(LifecycleParam::BlockDestruction);
        let err = options
            .check(&plan(
                true,
                vec![Effect::Delete, Effect::Create],
                vec![recreate_diff()],
            ))
            .unwrap_err();
        assert!(err.to_string().contains("Lifetime"));
    }

    #[test]
    fn block_modification() {
        let options = ApplyOptions::new().with_lifecycle_param(LifecycleParam::BlockModification);
        let update = Effect::Update {
            operation: "UpdateThing".to_string(),
            update_mask: vec!["labels".to_string()],
        };
        assert!(options.check(&plan(true, vec![update], vec![])).is_err());
    }
}
