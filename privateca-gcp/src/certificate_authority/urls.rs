//! REST URL builders
//!
//! Every builder substitutes the resource's URL parameters into a path
//! template relative to the API base path. A missing parameter is an error.

use privateca_core::provider::ProviderResult;

use super::{CertificateAuthority, DeleteOptions};
use crate::utils::url_template;

const COLLECTION: &str =
    "projects/{{project}}/locations/{{location}}/caPools/{{ca_pool}}/certificateAuthorities";
const RESOURCE: &str = "projects/{{project}}/locations/{{location}}/caPools/{{ca_pool}}/certificateAuthorities/{{name}}";

/// Page size requested by list calls
pub const LIST_PAGE_SIZE: u32 = 256;

fn params(ca: &CertificateAuthority) -> [(&'static str, &str); 4] {
    [
        ("project", ca.project.as_deref().unwrap_or_default()),
        ("location", ca.location.as_deref().unwrap_or_default()),
        ("ca_pool", ca.ca_pool.as_deref().unwrap_or_default()),
        ("name", ca.short_id()),
    ]
}

fn resource_url(suffix: &str, base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    Ok(url_template(&format!("{RESOURCE}{suffix}"), base_path, &params(ca))?)
}

pub fn get_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    resource_url("", base_path, ca)
}

/// Collection URL; only project, location and CA pool are needed
pub fn collection_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    Ok(url_template(COLLECTION, base_path, &params(ca))?)
}

/// One page of the collection, continuing after `page_token` if given
pub fn list_url(
    base_path: &str,
    ca: &CertificateAuthority,
    page_token: Option<&str>,
) -> ProviderResult<String> {
    let mut url = format!("{}?pageSize={}", collection_url(base_path, ca)?, LIST_PAGE_SIZE);
    if let Some(token) = page_token.filter(|t| !t.is_empty()) {
        url.push_str("&pageToken=");
        url.push_str(&urlencoding::encode(token));
    }
    Ok(url)
}

pub fn create_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    Ok(url_template(
        &format!("{COLLECTION}?certificateAuthorityId={{{{name}}}}"),
        base_path,
        &params(ca),
    )?)
}

/// PATCH URL with the comma-joined update mask
pub fn update_url(
    base_path: &str,
    ca: &CertificateAuthority,
    update_mask: &[String],
) -> ProviderResult<String> {
    let url = get_url(base_path, ca)?;
    Ok(format!(
        "{url}?updateMask={}",
        urlencoding::encode(&update_mask.join(","))
    ))
}

pub fn delete_url(
    base_path: &str,
    ca: &CertificateAuthority,
    options: &DeleteOptions,
) -> ProviderResult<String> {
    let url = get_url(base_path, ca)?;
    Ok(format!(
        "{url}?ignoreActiveCertificates={}&skipGracePeriod={}",
        options.ignore_active_certificates, options.skip_grace_period
    ))
}

pub fn enable_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    resource_url(":enable", base_path, ca)
}

pub fn disable_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    resource_url(":disable", base_path, ca)
}

/// URL of the `fetch` call that returns a subordinate CA's CSR
pub fn fetch_csr_url(base_path: &str, ca: &CertificateAuthority) -> ProviderResult<String> {
    resource_url(":fetch", base_path, ca)
}
