//! Plan - Ordered Effects for one resource
//!
//! A Plan is computed from field diffs before anything is changed.
//! No side effects occur until the Plan is applied.

use crate::differ::FieldDiff;
use crate::effect::Effect;
use crate::resource::ResourceId;

/// Plan containing Effects to be executed
#[derive(Debug, Clone)]
pub struct Plan {
    id: ResourceId,
    exists: bool,
    diffs: Vec<FieldDiff>,
    effects: Vec<Effect>,
}

impl Plan {
    pub fn new(id: ResourceId, exists: bool) -> Self {
        Self {
            id,
            exists,
            diffs: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_diffs(mut self, diffs: Vec<FieldDiff>) -> Self {
        self.diffs = diffs;
        self
    }

    pub fn add(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Whether the resource was found when the plan was computed
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn diffs(&self) -> &[FieldDiff] {
        &self.diffs
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// An existing resource is deleted and created again
    pub fn is_recreate(&self) -> bool {
        self.exists
            && self.effects.contains(&Effect::Delete)
            && self.effects.contains(&Effect::Create)
    }

    /// Generate a summary of the Plan for display
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for effect in &self.effects {
            match effect {
                Effect::Create => summary.create += 1,
                Effect::Update { .. } => summary.update += 1,
                Effect::Delete => summary.delete += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan: {} to create, {} to update, {} to delete",
            self.create, self.update, self.delete
        )
    }
}
