//! PrivateCaProvider - Certificate Authority operations over REST
//!
//! Reads flatten the response into the typed resource. Mutations expand the
//! resource into a request body and wait for the long-running operation the
//! server returns.

use log::{debug, info};
use privateca_core::apply::{Reconciliation, reconcile};
use privateca_core::lifecycle::ApplyOptions;
use privateca_core::provider::{ProviderError, ProviderResult};
use privateca_core::resource::Resource;
use reqwest::Method;
use serde::Deserialize;

use super::wire::{self, ListCertificateAuthoritiesResponse};
use super::{CertificateAuthority, State, urls};
use crate::client::PrivateCaClient;
use crate::config::ClientConfig;

/// Query options of a delete call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Delete even if the CA has unexpired certificates
    pub ignore_active_certificates: bool,
    /// Skip the 30 day grace period and delete immediately
    pub skip_grace_period: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchCsrResponse {
    pem_csr: Option<String>,
}

/// Certificate Authority Service provider
#[derive(Debug)]
pub struct PrivateCaProvider {
    client: PrivateCaClient,
    delete_options: DeleteOptions,
}

impl PrivateCaProvider {
    pub fn new(config: ClientConfig) -> ProviderResult<Self> {
        Ok(Self::with_client(PrivateCaClient::new(config)?))
    }

    pub fn with_client(client: PrivateCaClient) -> Self {
        Self {
            client,
            delete_options: DeleteOptions::default(),
        }
    }

    /// Options used when apply has to delete a CA to recreate it
    pub fn with_delete_options(mut self, options: DeleteOptions) -> Self {
        self.delete_options = options;
        self
    }

    pub fn client(&self) -> &PrivateCaClient {
        &self.client
    }

    pub(crate) fn delete_options(&self) -> DeleteOptions {
        self.delete_options
    }

    fn base_path(&self) -> &str {
        self.client.base_path()
    }

    /// Read a CA. A CA pending deletion counts as not found.
    pub async fn get_certificate_authority(
        &self,
        ca: &CertificateAuthority,
    ) -> ProviderResult<CertificateAuthority> {
        let id = ca.id();
        let url = urls::get_url(self.base_path(), ca)?;
        let response = self
            .client
            .send(Method::GET, &url, None)
            .await
            .map_err(|e| e.for_resource(&id))?;

        let observed = wire::flatten(response, ca)?;
        if observed.state == Some(State::Deleted) {
            debug!("{} is pending deletion", id);
            return Err(ProviderError::NotFound { id });
        }
        Ok(observed)
    }

    /// List every CA in a pool, following page tokens
    pub async fn list_certificate_authorities(
        &self,
        project: &str,
        location: &str,
        ca_pool: &str,
    ) -> ProviderResult<Vec<CertificateAuthority>> {
        let request = CertificateAuthority {
            project: Some(project.to_string()),
            location: Some(location.to_string()),
            ca_pool: Some(ca_pool.to_string()),
            ..Default::default()
        };

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = urls::list_url(self.base_path(), &request, page_token.as_deref())?;
            let response = self.client.send(Method::GET, &url, None).await?;
            let page: ListCertificateAuthoritiesResponse = serde_json::from_value(response)
                .map_err(|e| ProviderError::Serialization(format!("Invalid list response: {e}")))?;

            for value in page.certificate_authorities {
                items.push(wire::flatten(value, &request)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Found {} certificate authorities in {}/{}/{}",
            items.len(),
            project,
            location,
            ca_pool
        );
        Ok(items)
    }

    pub async fn create_certificate_authority(&self, ca: &CertificateAuthority) -> ProviderResult<()> {
        let url = urls::create_url(self.base_path(), ca)?;
        let body = wire::expand(ca)?;
        info!("Creating {}", ca.id());
        self.client
            .send_and_wait(Method::POST, &url, Some(&body))
            .await?;
        Ok(())
    }

    /// PATCH the fields named in `update_mask`
    pub async fn update_certificate_authority(
        &self,
        ca: &CertificateAuthority,
        update_mask: &[String],
    ) -> ProviderResult<()> {
        let url = urls::update_url(self.base_path(), ca, update_mask)?;
        let body = wire::expand_update(ca, update_mask)?;
        info!("Updating {} ({})", ca.id(), update_mask.join(", "));
        self.client
            .send_and_wait(Method::PATCH, &url, Some(&body))
            .await
            .map_err(|e| e.for_resource(&ca.id()))?;
        Ok(())
    }

    /// Delete a CA, disabling it first if it is enabled.
    ///
    /// A CA that does not exist counts as deleted.
    pub async fn delete_certificate_authority(
        &self,
        ca: &CertificateAuthority,
        options: &DeleteOptions,
    ) -> ProviderResult<()> {
        let id = ca.id();
        let observed = match self.get_certificate_authority(ca).await {
            Ok(observed) => observed,
            Err(e) if e.is_not_found() => {
                debug!("{} is already gone", id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if observed.is_enabled() {
            self.disable_certificate_authority(ca).await?;
        }

        let url = urls::delete_url(self.base_path(), ca, options)?;
        info!("Deleting {}", id);
        match self.client.send_and_wait(Method::DELETE, &url, None).await {
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
            Ok(_) => Ok(()),
        }
    }

    /// Delete every CA in a pool that `filter` accepts; returns how many were deleted
    pub async fn delete_all_certificate_authorities(
        &self,
        project: &str,
        location: &str,
        ca_pool: &str,
        options: &DeleteOptions,
        filter: impl Fn(&CertificateAuthority) -> bool,
    ) -> ProviderResult<usize> {
        let mut deleted = 0;
        for ca in self
            .list_certificate_authorities(project, location, ca_pool)
            .await?
        {
            if !filter(&ca) || ca.state == Some(State::Deleted) {
                continue;
            }
            self.delete_certificate_authority(&ca, options).await?;
            deleted += 1;
        }
        Ok(deleted)
    }

    pub async fn enable_certificate_authority(&self, ca: &CertificateAuthority) -> ProviderResult<()> {
        let url = urls::enable_url(self.base_path(), ca)?;
        info!("Enabling {}", ca.id());
        self.client
            .send_and_wait(Method::POST, &url, Some(&serde_json::json!({})))
            .await
            .map_err(|e| e.for_resource(&ca.id()))?;
        Ok(())
    }

    pub async fn disable_certificate_authority(&self, ca: &CertificateAuthority) -> ProviderResult<()> {
        let url = urls::disable_url(self.base_path(), ca)?;
        info!("Disabling {}", ca.id());
        self.client
            .send_and_wait(Method::POST, &url, Some(&serde_json::json!({})))
            .await
            .map_err(|e| e.for_resource(&ca.id()))?;
        Ok(())
    }

    /// PEM certificate signing request of a subordinate CA awaiting activation
    pub async fn fetch_csr(&self, ca: &CertificateAuthority) -> ProviderResult<String> {
        let url = urls::fetch_csr_url(self.base_path(), ca)?;
        let response = self
            .client
            .send(Method::GET, &url, None)
            .await
            .map_err(|e| e.for_resource(&ca.id()))?;
        let body: FetchCsrResponse = serde_json::from_value(response)
            .map_err(|e| ProviderError::Serialization(format!("Invalid fetch response: {e}")))?;
        body.pem_csr.ok_or_else(|| {
            ProviderError::Serialization(format!("{} returned no pemCsr", ca.id()))
        })
    }

    /// Compute the Plan for `raw_desired` without changing anything
    pub async fn plan(
        &self,
        raw_desired: &CertificateAuthority,
    ) -> ProviderResult<Reconciliation<CertificateAuthority>> {
        reconcile(self, raw_desired).await
    }

    /// Reconcile the remote CA with `raw_desired` and return its new state
    pub async fn apply(
        &self,
        raw_desired: &CertificateAuthority,
        options: &ApplyOptions,
    ) -> ProviderResult<CertificateAuthority> {
        privateca_core::apply::apply(self, raw_desired, options).await
    }

    /// Execute a Plan returned by [`Self::plan`] as it was computed
    pub async fn apply_reconciliation(
        &self,
        raw_desired: &CertificateAuthority,
        reconciliation: Reconciliation<CertificateAuthority>,
        options: &ApplyOptions,
    ) -> ProviderResult<CertificateAuthority> {
        privateca_core::apply::apply_reconciliation(self, raw_desired, reconciliation, options).await
    }
}
