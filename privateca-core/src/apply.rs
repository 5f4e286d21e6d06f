//! Apply - Drive a resource from its observed state to its desired state
//!
//! The sequence is the same for every resource: validate, read, canonicalize,
//! diff, plan, check lifecycle params, execute, then read back and verify that
//! nothing differs any more.

use log::{debug, info};

use crate::differ::create_plan;
use crate::effect::Effect;
use crate::lifecycle::ApplyOptions;
use crate::plan::Plan;
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::Resource;

/// Desired and observed state of one resource plus the Plan between them
#[derive(Debug, Clone)]
pub struct Reconciliation<R> {
    /// Desired state canonicalized against `initial`
    pub desired: R,
    /// Observed state, `None` when the resource does not exist
    pub initial: Option<R>,
    pub plan: Plan,
}

/// Read a resource and compute the Plan that would reconcile it
pub async fn reconcile<R, P>(provider: &P, raw_desired: &R) -> ProviderResult<Reconciliation<R>>
where
    R: Resource,
    P: Provider<R> + ?Sized,
{
    let id = raw_desired.id();
    raw_desired
        .validate()
        .map_err(|source| ProviderError::Validation {
            id: id.clone(),
            source,
        })?;

    let initial = match provider.get(raw_desired).await {
        Ok(observed) => Some(observed),
        Err(e) if e.is_not_found() => {
            debug!("{} does not exist yet", id);
            None
        }
        Err(e) => return Err(e),
    };

    let desired = raw_desired.canonicalize_desired(initial.as_ref());
    let diffs = initial.as_ref().map(|observed| desired.diff(observed));
    for d in diffs.iter().flatten() {
        debug!("{}: {}", id, d);
    }

    Ok(Reconciliation {
        desired,
        initial,
        plan: create_plan(id, diffs),
    })
}

/// Apply the desired state and return the canonicalized resulting state
pub async fn apply<R, P>(provider: &P, raw_desired: &R, options: &ApplyOptions) -> ProviderResult<R>
where
    R: Resource,
    P: Provider<R> + ?Sized,
{
    let reconciliation = reconcile(provider, raw_desired).await?;
    apply_reconciliation(provider, raw_desired, reconciliation, options).await
}

/// Execute a Plan computed earlier by [`reconcile`], without reading the
/// resource again first, and return the canonicalized resulting state
pub async fn apply_reconciliation<R, P>(
    provider: &P,
    raw_desired: &R,
    reconciliation: Reconciliation<R>,
    options: &ApplyOptions,
) -> ProviderResult<R>
where
    R: Resource,
    P: Provider<R> + ?Sized,
{
    let Reconciliation {
        desired,
        initial,
        plan,
    } = reconciliation;
    options.check(&plan)?;

    if plan.is_empty()
        && let Some(observed) = initial
    {
        info!("{} is up to date", plan.id());
        return Ok(observed.canonicalize_new(&desired));
    }

    for effect in plan.effects() {
        info!("{}: {}", plan.id(), effect);
        match effect {
            Effect::Create => provider.create(&desired).await?,
            Effect::Update {
                operation,
                update_mask,
            } => provider.update(&desired, operation, update_mask).await?,
            Effect::Delete => provider.delete(&desired).await?,
        }
    }

    let new_state = provider
        .get(&desired)
        .await
        .map_err(|e| e.for_resource(plan.id()))?
        .canonicalize_new(&desired);

    let new_desired = raw_desired.canonicalize_desired(Some(&new_state));
    let remaining = new_desired.diff(&new_state);
    if !remaining.is_empty() {
        return Err(ProviderError::DiffAfterApply {
            id: plan.id().clone(),
            fields: remaining.iter().map(ToString::to_string).collect(),
        });
    }

    Ok(new_state)
}

/// Delete a resource; a resource that is already gone counts as deleted
pub async fn delete<R, P>(provider: &P, resource: &R) -> ProviderResult<()>
where
    R: Resource,
    P: Provider<R> + ?Sized,
{
    match provider.delete(resource).await {
        Err(e) if e.is_not_found() => {
            debug!("{} was already deleted", resource.id());
            Ok(())
        }
        result => result,
    }
}
