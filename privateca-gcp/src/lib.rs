//! Certificate Authority Service Provider
//!
//! Binds the `CertificateAuthority` resource of
//! `privateca.googleapis.com/v1` to the reconcile driver in `privateca-core`.
//!
//! ## Module Structure
//!
//! - `certificate_authority` - Resource model, diff, canonicalization and CRUD
//! - `client` - Authenticated REST transport
//! - `config` - Client configuration
//! - `enums` - String enums that tolerate unknown values
//! - `operation` - Long-running operation polling
//! - `retry` - Exponential backoff for transient failures
//! - `utils` - URL templating

pub mod certificate_authority;
pub mod client;
pub mod config;
pub mod enums;
pub mod operation;
pub mod retry;
pub mod utils;

// Re-export main types
pub use certificate_authority::provider::{DeleteOptions, PrivateCaProvider};
pub use certificate_authority::{CertificateAuthority, UPDATE_OPERATION};
pub use client::PrivateCaClient;
pub use config::ClientConfig;
pub use retry::RetryPolicy;

use privateca_core::provider::{BoxFuture, Provider, ProviderError, ProviderResult};
use privateca_core::resource::Resource;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider<CertificateAuthority> for PrivateCaProvider {
    fn name(&self) -> &'static str {
        "privateca"
    }

    fn get(&self, resource: &CertificateAuthority) -> BoxFuture<'_, ProviderResult<CertificateAuthority>> {
        let resource = resource.clone();
        Box::pin(async move { self.get_certificate_authority(&resource).await })
    }

    fn create(&self, resource: &CertificateAuthority) -> BoxFuture<'_, ProviderResult<()>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_certificate_authority(&resource).await })
    }

    fn update(
        &self,
        resource: &CertificateAuthority,
        operation: &str,
        update_mask: &[String],
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let resource = resource.clone();
        let operation = operation.to_string();
        let update_mask = update_mask.to_vec();
        Box::pin(async move {
            if operation != UPDATE_OPERATION {
                return Err(ProviderError::Configuration(format!(
                    "{} has no update operation named {}",
                    resource.id(),
                    operation
                )));
            }
            self.update_certificate_authority(&resource, &update_mask)
                .await
        })
    }

    fn delete(&self, resource: &CertificateAuthority) -> BoxFuture<'_, ProviderResult<()>> {
        let resource = resource.clone();
        let options = self.delete_options();
        Box::pin(async move { self.delete_certificate_authority(&resource, &options).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate_authority::testdata::root_ca;
    use std::time::Duration;

    fn provider() -> PrivateCaProvider {
        let config = ClientConfig::new()
            .with_base_path("http://127.0.0.1:9/v1/")
            .with_access_token("t")
            .with_retry(RetryPolicy::none())
            .with_request_timeout(Duration::from_millis(200));
        PrivateCaProvider::new(config).unwrap()
    }

    #[test]
    fn provider_name() {
        assert_eq!(Provider::<CertificateAuthority>::name(&provider()), "privateca");
    }

    #[tokio::test]
    async fn unknown_update_operation_is_rejected() {
        let provider = provider();
        let err = Provider::update(&provider, &root_ca(), "RotateKeys", &["labels".to_string()])
            .await
            .unwrap_err();
        match err {
            ProviderError::Configuration(message) => assert!(message.contains("RotateKeys")),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn boxed_provider_dispatch() {
        let boxed: Box<dyn Provider<CertificateAuthority>> = Box::new(provider());
        assert_eq!(boxed.name(), "privateca");
    }
}
