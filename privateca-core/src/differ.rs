//! Differ - Compare desired state with observed state to generate a Plan
//!
//! Resources compare themselves field by field through [`Differ`], which
//! collects one [`FieldDiff`] per differing leaf. The collected diffs are then
//! mapped to the API operations needed to reconcile them (recreate, in-place
//! update, or nothing).

use std::fmt;

use heck::ToSnakeCase;

use crate::effect::Effect;
use crate::field::Field;
use crate::plan::Plan;
use crate::resource::ResourceId;

/// Dotted path of a field inside a resource (e.g. `Config.X509Config.PolicyIds[0]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path of the resource root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a named child field
    pub fn nest(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path of a list element
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment of the path, without any list index
    pub fn top_level(&self) -> &str {
        let end = self.0.find(['.', '[']).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// API operation needed to reconcile a differing field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationSelector {
    /// Field is immutable; the resource must be deleted and created again
    Recreate,
    /// Field can be changed by the named in-place update operation
    Update(&'static str),
}

/// How a field takes part in diffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffInfo {
    pub operation: OperationSelector,
    /// Server-populated field; never reported as a diff
    pub output_only: bool,
    /// Field is not managed; never reported as a diff
    pub ignore: bool,
}

impl DiffInfo {
    pub const fn recreate() -> Self {
        Self {
            operation: OperationSelector::Recreate,
            output_only: false,
            ignore: false,
        }
    }

    pub const fn update(operation: &'static str) -> Self {
        Self {
            operation: OperationSelector::Update(operation),
            output_only: false,
            ignore: false,
        }
    }

    pub const fn output_only() -> Self {
        Self {
            operation: OperationSelector::Recreate,
            output_only: true,
            ignore: false,
        }
    }

    pub const fn ignored() -> Self {
        Self {
            operation: OperationSelector::Recreate,
            output_only: false,
            ignore: true,
        }
    }
}

/// A single differing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field_name: FieldPath,
    pub desired: Option<String>,
    pub actual: Option<String>,
    pub operation: OperationSelector,
}

impl FieldDiff {
    pub fn requires_recreate(&self) -> bool {
        self.operation == OperationSelector::Recreate
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.field_name,
            self.actual.as_deref().unwrap_or("<unset>"),
            self.desired.as_deref().unwrap_or("<unset>")
        )
    }
}

/// Collects field diffs while a resource compares itself
#[derive(Debug, Default)]
pub struct Differ {
    diffs: Vec<FieldDiff>,
}

impl Differ {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare one optional field.
    ///
    /// A field unset in `desired` is left to the server and never differs.
    /// Zero values (empty string, `false`, empty list) are equivalent to unset.
    pub fn diff_field<T: Field>(
        &mut self,
        desired: &Option<T>,
        actual: &Option<T>,
        info: DiffInfo,
        path: FieldPath,
    ) {
        if info.output_only || info.ignore {
            return;
        }

        match (desired, actual) {
            (None, _) => {}
            (Some(d), None) => {
                if !d.is_zero() {
                    self.push(&path, Some(d.render()), None, info);
                }
            }
            (Some(d), Some(a)) => {
                if !(d.is_zero() && a.is_zero()) {
                    d.compare(a, info, &path, self);
                }
            }
        }
    }

    /// Record a difference at `path`
    pub fn push(
        &mut self,
        path: &FieldPath,
        desired: Option<String>,
        actual: Option<String>,
        info: DiffInfo,
    ) {
        self.diffs.push(FieldDiff {
            field_name: path.clone(),
            desired,
            actual,
            operation: info.operation,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn into_diffs(self) -> Vec<FieldDiff> {
        self.diffs
    }
}

/// Map field diffs to the effects needed to reconcile them.
///
/// Any diff on an immutable field forces a recreate; otherwise each distinct
/// update operation runs once with an update mask of the top-level fields it
/// touches.
pub fn plan_operations(diffs: &[FieldDiff]) -> Vec<Effect> {
    if diffs.is_empty() {
        return Vec::new();
    }

    if diffs.iter().any(FieldDiff::requires_recreate) {
        return vec![Effect::Delete, Effect::Create];
    }

    let mut updates: Vec<(&'static str, Vec<String>)> = Vec::new();
    for d in diffs {
        let OperationSelector::Update(operation) = d.operation else {
            continue;
        };
        let mask_field = d.field_name.top_level().to_snake_case();

        match updates.iter_mut().find(|(op, _)| *op == operation) {
            Some((_, mask)) => {
                if !mask.contains(&mask_field) {
                    mask.push(mask_field);
                }
            }
            None => updates.push((operation, vec![mask_field])),
        }
    }

    updates
        .into_iter()
        .map(|(operation, update_mask)| Effect::Update {
            operation: operation.to_string(),
            update_mask,
        })
        .collect()
}

/// Compute the Plan for one resource.
///
/// `diffs` is `None` when the resource does not exist yet.
pub fn create_plan(id: ResourceId, diffs: Option<Vec<FieldDiff>>) -> Plan {
    let Some(diffs) = diffs else {
        let mut plan = Plan::new(id, false);
        plan.add(Effect::Create);
        return plan;
    };

    let effects = plan_operations(&diffs);
    let mut plan = Plan::new(id, true).with_diffs(diffs);
    for effect in effects {
        plan.add(effect);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(path: &str, operation: OperationSelector) -> FieldDiff {
        FieldDiff {
            field_name: FieldPath::root().nest(path),
            desired: Some("a".to_string()),
            actual: Some("b".to_string()),
            operation,
        }
    }

    #[test]
    fn field_path_nesting() {
        let path = FieldPath::root()
            .nest("Config")
            .nest("X509Config")
            .nest("PolicyIds")
            .index(2)
            .nest("ObjectIdPath");
        assert_eq!(path.as_str(), "Config.X509Config.PolicyIds[2].ObjectIdPath");
        assert_eq!(path.top_level(), "Config");
        assert_eq!(FieldPath::root().nest("Labels").top_level(), "Labels");
        assert_eq!(FieldPath::root().nest("Items").index(0).top_level(), "Items");
    }

    #[test]
    fn unset_desired_never_differs() {
        let mut differ = Differ::new();
        differ.diff_field::<String>(
            &None,
            &Some("server".to_string()),
            DiffInfo::recreate(),
            FieldPath::root().nest("Name"),
        );
        assert!(differ.is_empty());
    }

    #[test]
    fn zero_desired_matches_absent_actual() {
        let mut differ = Differ::new();
        differ.diff_field(
            &Some(false),
            &None,
            DiffInfo::recreate(),
            FieldPath::root().nest("Critical"),
        );
        differ.diff_field(
            &Some(String::new()),
            &Some(String::new()),
            DiffInfo::recreate(),
            FieldPath::root().nest("Value"),
        );
        assert!(differ.is_empty());
    }

    #[test]
    fn output_only_never_differs() {
        let mut differ = Differ::new();
        differ.diff_field(
            &Some("ENABLED".to_string()),
            &Some("STAGED".to_string()),
            DiffInfo::output_only(),
            FieldPath::root().nest("State"),
        );
        assert!(differ.is_empty());
    }

    #[test]
    fn scalar_difference_is_recorded() {
        let mut differ = Differ::new();
        differ.diff_field(
            &Some("us-east1".to_string()),
            &Some("us-west1".to_string()),
            DiffInfo::recreate(),
            FieldPath::root().nest("Location"),
        );
        let diffs = differ.into_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field_name.as_str(), "Location");
        assert_eq!(diffs[0].desired.as_deref(), Some("\"us-east1\""));
        assert_eq!(diffs[0].actual.as_deref(), Some("\"us-west1\""));
        assert!(diffs[0].requires_recreate());
    }

    #[test]
    fn list_length_mismatch_is_one_diff() {
        let mut differ = Differ::new();
        differ.diff_field(
            &Some(vec!["a".to_string(), "b".to_string()]),
            &Some(vec!["a".to_string()]),
            DiffInfo::recreate(),
            FieldPath::root().nest("DnsNames"),
        );
        let diffs = differ.into_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field_name.as_str(), "DnsNames");
    }

    #[test]
    fn list_elements_compare_by_index() {
        let mut differ = Differ::new();
        differ.diff_field(
            &Some(vec![1, 2, 3]),
            &Some(vec![1, 5, 3]),
            DiffInfo::recreate(),
            FieldPath::root().nest("ObjectIdPath"),
        );
        let diffs = differ.into_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field_name.as_str(), "ObjectIdPath[1]");
    }

    #[test]
    fn no_diffs_no_effects() {
        assert!(plan_operations(&[]).is_empty());
    }

    #[test]
    fn recreate_wins_over_update() {
        let diffs = vec![
            diff("Labels", OperationSelector::Update("UpdateThing")),
            diff("Lifetime", OperationSelector::Recreate),
        ];
        assert_eq!(plan_operations(&diffs), vec![Effect::Delete, Effect::Create]);
    }

    #[test]
    fn updates_are_grouped_with_snake_case_mask() {
        let diffs = vec![
            diff("Labels", OperationSelector::Update("UpdateThing")),
            diff("GcsBucket", OperationSelector::Update("UpdateThing")),
            diff("Labels", OperationSelector::Update("UpdateThing")),
        ];
        assert_eq!(
            plan_operations(&diffs),
            vec![Effect::Update {
                operation: "UpdateThing".to_string(),
                update_mask: vec!["labels".to_string(), "gcs_bucket".to_string()],
            }]
        );
    }

    #[test]
    fn create_plan_when_not_exists() {
        let plan = create_plan(ResourceId::new("thing", "a"), None);
        assert!(!plan.exists());
        assert_eq!(plan.effects(), &[Effect::Create]);
    }

    #[test]
    fn create_plan_no_change_when_same() {
        let plan = create_plan(ResourceId::new("thing", "a"), Some(vec![]));
        assert!(plan.exists());
        assert!(plan.is_empty());
    }
}
