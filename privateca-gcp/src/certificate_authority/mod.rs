//! Certificate Authority resource
//!
//! The model mirrors the REST representation of
//! `projects/*/locations/*/caPools/*/certificateAuthorities/*`. Every field is
//! optional: `None` is "unset", `Some(Default::default())` an explicitly empty
//! value.
//!
//! ## Module Structure
//!
//! - `fields` - Per-type field comparison and canonicalization
//! - `canonicalize` - Resource-level canonicalization
//! - `diff` - Resource-level diff
//! - `validate` - Required fields and one-of groups
//! - `wire` - Request bodies and response decoding
//! - `urls` - REST URL builders
//! - `provider` - CRUD and reconcile operations

mod canonicalize;
mod diff;
mod fields;
mod validate;

pub mod provider;
pub mod urls;
pub mod wire;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use privateca_core::canonical::short_name;
use privateca_core::differ::FieldDiff;
use privateca_core::resource::{Resource, ResourceId};
use privateca_core::validation::ValidationError;
use serde::{Deserialize, Serialize};

pub use crate::enums::{CertificateAuthorityType, KeyFormat, SignHashAlgorithm, State, Tier};
pub use provider::DeleteOptions;

/// Name of the in-place update operation (only `labels` is mutable)
pub const UPDATE_OPERATION: &str = "UpdateCertificateAuthority";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    /// Short id, the last segment of the resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_pool: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ca_type: Option<CertificateAuthorityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
    /// Protobuf duration, e.g. `"315360000s"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_spec: Option<KeySpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subordinate_config: Option<SubordinateConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcs_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    // Output only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem_ca_certificates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_certificate_descriptions: Option<Vec<CertificateDescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_urls: Option<AccessUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_config: Option<SubjectConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_config: Option<X509Config>,
    /// Output only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_alt_name: Option<SubjectAltName>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAltName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sans: Option<Vec<X509Extension>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Extension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<bool>,
    /// Base64-encoded extension value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id_path: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_usage: Option<KeyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_options: Option<CaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_ids: Option<Vec<ObjectId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aia_ocsp_servers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_extensions: Option<Vec<X509Extension>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_key_usage: Option<BaseKeyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_key_usage: Option<ExtendedKeyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_extended_key_usages: Option<Vec<ObjectId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseKeyUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_commitment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_encipherment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_encipherment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_sign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_sign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encipher_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decipher_only: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedKeyUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_signing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_stamping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocsp_signing: Option<bool>,
}

/// Basic constraints of the CA certificate.
///
/// The API omits `maxIssuerPathLength` when it is zero, so an explicit zero
/// is carried by `zero_max_issuer_path_length` and sent as `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "wire::CaOptionsWire", into = "wire::CaOptionsWire")]
pub struct CaOptions {
    pub is_ca: Option<bool>,
    pub max_issuer_path_length: Option<i64>,
    pub zero_max_issuer_path_length: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    /// Base64-encoded key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<KeyFormat>,
}

/// Key used to sign certificates; exactly one of the two fields is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    /// Cloud KMS key version resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_kms_key_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<SignHashAlgorithm>,
}

/// Issuer of a subordinate CA; exactly one of the two fields is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubordinateConfig {
    /// Issuing Certificate Authority resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem_issuer_chain: Option<SubordinateConfigPemIssuerChain>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubordinateConfigPemIssuerChain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem_certificates: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_certificate_access_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_access_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_description: Option<SubjectDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_description: Option<X509Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_key_id: Option<KeyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_key_id: Option<KeyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_distribution_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aia_issuing_certificate_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_fingerprint: Option<CertificateFingerprint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_alt_name: Option<SubjectAltName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateFingerprint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,
}

impl CertificateAuthority {
    /// `projects/{project}/locations/{location}/caPools/{caPool}/certificateAuthorities/{name}`
    pub fn relative_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/caPools/{}/certificateAuthorities/{}",
            self.project.as_deref().unwrap_or_default(),
            self.location.as_deref().unwrap_or_default(),
            self.ca_pool.as_deref().unwrap_or_default(),
            self.short_id()
        )
    }

    /// Last segment of `name`; a full resource path is accepted as well
    pub fn short_id(&self) -> &str {
        self.name.as_deref().map(short_name).unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.state == Some(State::Enabled)
    }
}

impl Resource for CertificateAuthority {
    const RESOURCE_TYPE: &'static str = "privateca.certificate_authority";

    fn id(&self) -> ResourceId {
        ResourceId::new(Self::RESOURCE_TYPE, self.relative_name())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate::validate(self)
    }

    fn canonicalize_desired(&self, initial: Option<&Self>) -> Self {
        canonicalize::canonicalize_desired(self, initial)
    }

    fn canonicalize_new(&self, desired: &Self) -> Self {
        canonicalize::canonicalize_new(self, desired)
    }

    fn diff(&self, actual: &Self) -> Vec<FieldDiff> {
        diff::diff(self, actual)
    }
}


#[cfg(test)]
mod tests {
    use super::testdata::root_ca;
    use super::*;

    #[test]
    fn id_uses_relative_name() {
        let id = root_ca().id();
        assert_eq!(id.resource_type, "privateca.certificate_authority");
        assert_eq!(
            id.name,
            "projects/my-project/locations/us-central1/caPools/my-pool/certificateAuthorities/root-ca"
        );
    }

    #[test]
    fn id_accepts_full_resource_name() {
        let mut ca = root_ca();
        ca.name = Some(format!("//privateca.googleapis.com/{}", root_ca().relative_name()));
        assert_eq!(ca.short_id(), "root-ca");
        assert_eq!(ca.id(), root_ca().id());
    }

    #[test]
    fn manifest_json_uses_camel_case() {
        let ca: CertificateAuthority = serde_json::from_value(serde_json::json!({
            "name": "sub-ca",
            "project": "p",
            "location": "l",
            "caPool": "pool",
            "type": "SUBORDINATE",
            "lifetime": "86400s",
            "keySpec": {"cloudKmsKeyVersion": "projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/1"},
            "subordinateConfig": {"certificateAuthority": "root-ca"},
            "createTime": "2024-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(ca.ca_pool.as_deref(), Some("pool"));
        assert_eq!(ca.ca_type, Some(CertificateAuthorityType::Subordinate));
        assert_eq!(
            ca.subordinate_config.unwrap().certificate_authority.as_deref(),
            Some("root-ca")
        );
        assert_eq!(ca.create_time.unwrap().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }
}
