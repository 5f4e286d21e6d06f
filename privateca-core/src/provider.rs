//! Provider - Trait abstracting resource operations
//!
//! A Provider knows how to read and mutate one kind of resource on a remote
//! API. The reconcile driver in [`crate::apply`] turns Plans into calls on it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::resource::{Resource, ResourceId};
use crate::validation::ValidationError;

/// Error type for Provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The resource does not exist
    #[error("{id} not found")]
    NotFound { id: ResourceId },

    /// The API answered with an error status
    #[error("API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{id} is invalid: {source}")]
    Validation {
        id: ResourceId,
        #[source]
        source: ValidationError,
    },

    /// A long-running operation finished with an error
    #[error("Operation {name} failed with code {code}: {message}")]
    OperationFailed {
        name: String,
        code: i32,
        message: String,
    },

    #[error("Operation {name} did not finish within {timeout:?}")]
    OperationTimeout { name: String, timeout: Duration },

    /// The plan conflicts with the caller's lifecycle params
    #[error("Apply of {id} is infeasible: {reason}")]
    ApplyInfeasible { id: ResourceId, reason: String },

    /// The resource still differs from the desired state after all effects ran
    #[error("{id} still differs after apply: {}", .fields.join("; "))]
    DiffAfterApply { id: ResourceId, fields: Vec<String> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot build URL: {0}")]
    Url(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::NotFound { .. } | ProviderError::Api { code: 404, .. }
        )
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Http(_)
                | ProviderError::Api {
                    code: 429 | 500 | 502 | 503 | 504,
                    ..
                }
        )
    }

    /// Attach the resource identity to a bare 404
    pub fn for_resource(self, id: &ResourceId) -> Self {
        if self.is_not_found() {
            ProviderError::NotFound { id: id.clone() }
        } else {
            self
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Main Provider trait
///
/// All operations are async and involve side effects. Mutations return once
/// the remote change has completed.
pub trait Provider<R: Resource>: Send + Sync {
    /// Name of this Provider (e.g., "privateca")
    fn name(&self) -> &'static str;

    /// Read the current state of a resource
    ///
    /// Returns `ProviderError::NotFound` if the resource does not exist.
    fn get(&self, resource: &R) -> BoxFuture<'_, ProviderResult<R>>;

    /// Create a resource from its desired state
    fn create(&self, resource: &R) -> BoxFuture<'_, ProviderResult<()>>;

    /// Run an in-place update operation for the fields in `update_mask`
    fn update(
        &self,
        resource: &R,
        operation: &str,
        update_mask: &[String],
    ) -> BoxFuture<'_, ProviderResult<()>>;

    /// Delete a resource
    fn delete(&self, resource: &R) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl<R: Resource> Provider<R> for Box<dyn Provider<R>> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, resource: &R) -> BoxFuture<'_, ProviderResult<R>> {
        (**self).get(resource)
    }

    fn create(&self, resource: &R) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        resource: &R,
        operation: &str,
        update_mask: &[String],
    ) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).update(resource, operation, update_mask)
    }

    fn delete(&self, resource: &R) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(resource)
    }
}
