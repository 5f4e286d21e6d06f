//! Resource-level canonicalization

use privateca_core::canonical::{canonical_reference_desired, names_equivalent, short_name};
use privateca_core::field::{canonical_desired, canonical_new};

use super::CertificateAuthority;

/// Reduce a full resource name to the short id
fn short_id(name: &Option<String>) -> Option<String> {
    name.as_deref().map(|n| short_name(n).to_string())
}

pub(super) fn canonicalize_desired(
    raw: &CertificateAuthority,
    initial: Option<&CertificateAuthority>,
) -> CertificateAuthority {
    let name = short_id(&raw.name);
    let Some(initial) = initial else {
        return CertificateAuthority {
            name,
            ..raw.clone()
        };
    };

    CertificateAuthority {
        name: canonical_reference_desired(&name, &initial.name),
        project: canonical_desired(&raw.project, &initial.project),
        location: canonical_desired(&raw.location, &initial.location),
        ca_pool: canonical_desired(&raw.ca_pool, &initial.ca_pool),
        ca_type: canonical_desired(&raw.ca_type, &initial.ca_type),
        config: canonical_desired(&raw.config, &initial.config),
        lifetime: canonical_desired(&raw.lifetime, &initial.lifetime),
        key_spec: canonical_desired(&raw.key_spec, &initial.key_spec),
        subordinate_config: canonical_desired(&raw.subordinate_config, &initial.subordinate_config),
        gcs_bucket: canonical_desired(&raw.gcs_bucket, &initial.gcs_bucket),
        labels: canonical_desired(&raw.labels, &initial.labels),
        tier: initial.tier.clone(),
        state: initial.state.clone(),
        pem_ca_certificates: initial.pem_ca_certificates.clone(),
        ca_certificate_descriptions: initial.ca_certificate_descriptions.clone(),
        access_urls: initial.access_urls.clone(),
        create_time: initial.create_time,
        update_time: initial.update_time,
        delete_time: initial.delete_time,
        expire_time: initial.expire_time,
    }
}

pub(super) fn canonicalize_new(
    raw: &CertificateAuthority,
    desired: &CertificateAuthority,
) -> CertificateAuthority {
    let name = match (&raw.name, &desired.name) {
        (Some(n), Some(d)) if names_equivalent(n, d) => Some(d.clone()),
        _ => short_id(&raw.name),
    };

    CertificateAuthority {
        name,
        // URL parameters always come from the request
        project: desired.project.clone(),
        location: desired.location.clone(),
        ca_pool: desired.ca_pool.clone(),
        ca_type: canonical_new(&raw.ca_type, &desired.ca_type),
        config: canonical_new(&raw.config, &desired.config),
        lifetime: canonical_new(&raw.lifetime, &desired.lifetime),
        key_spec: canonical_new(&raw.key_spec, &desired.key_spec),
        subordinate_config: canonical_new(&raw.subordinate_config, &desired.subordinate_config),
        gcs_bucket: canonical_new(&raw.gcs_bucket, &desired.gcs_bucket),
        labels: canonical_new(&raw.labels, &desired.labels),
        ..raw.clone()
    }
}
