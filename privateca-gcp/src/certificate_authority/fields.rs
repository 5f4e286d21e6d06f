//! Field comparison and canonicalization of the nested object types

use privateca_core::canonical::{canonical_reference_desired, canonical_reference_new};
use privateca_core::differ::{DiffInfo, Differ, FieldPath};
use privateca_core::field::{Field, canonical_desired, canonical_new};

use super::*;

/// Implement [`Field`] for an object compared member by member.
///
/// Members are diffed under their UpperCamelCase name with the parent's
/// [`DiffInfo`]. `[output_only]` members never diff and always take the
/// observed value; `[reference]` members treat equivalent resource names as
/// equal.
macro_rules! object_field {
    (@info $info:ident) => { $info };
    (@info $info:ident output_only) => { DiffInfo::output_only() };
    (@info $info:ident reference) => { $info };

    (@desired output_only, $d:expr, $i:expr) => { $i.clone() };
    (@desired reference, $d:expr, $i:expr) => { canonical_reference_desired($d, $i) };
    (@desired $d:expr, $i:expr) => { canonical_desired($d, $i) };

    (@new output_only, $n:expr, $d:expr) => { $n.clone() };
    (@new reference, $n:expr, $d:expr) => { canonical_reference_new($n, $d) };
    (@new $n:expr, $d:expr) => { canonical_new($n, $d) };

    ($ty:ident { $($field:ident $([$mode:ident])?),+ $(,)? }) => {
        impl $ty {
            pub fn is_empty(&self) -> bool {
                *self == Self::default()
            }
        }

        impl Field for $ty {
            fn is_zero(&self) -> bool {
                self.is_empty()
            }

            fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ) {
                $(
                    differ.diff_field(
                        &self.$field,
                        &actual.$field,
                        object_field!(@info info $($mode)?),
                        path.nest(&member_name(stringify!($field))),
                    );
                )+
            }

            fn canonicalize_desired(&self, initial: &Self) -> Self {
                Self {
                    $($field: object_field!(@desired $($mode,)? &self.$field, &initial.$field),)+
                }
            }

            fn canonicalize_new(&self, desired: &Self) -> Self {
                if self.is_empty() && desired.is_empty() {
                    return desired.clone();
                }
                Self {
                    $($field: object_field!(@new $($mode,)? &self.$field, &desired.$field),)+
                }
            }
        }
    };
}

/// Diff path segment of a struct member (`subject_alt_name` -> `SubjectAltName`)
fn member_name(field: &str) -> String {
    heck::AsUpperCamelCase(field).to_string()
}

object_field!(Config {
    subject_config,
    x509_config,
    public_key[output_only],
});

object_field!(SubjectConfig {
    subject,
    subject_alt_name,
});

object_field!(Subject {
    common_name,
    country_code,
    organization,
    organizational_unit,
    locality,
    province,
    street_address,
    postal_code,
});

object_field!(SubjectAltName {
    dns_names,
    uris,
    email_addresses,
    ip_addresses,
    custom_sans,
});

object_field!(X509Extension {
    object_id,
    critical,
    value,
});

object_field!(ObjectId { object_id_path });

object_field!(X509Config {
    key_usage,
    ca_options,
    policy_ids,
    aia_ocsp_servers,
    additional_extensions,
});

object_field!(KeyUsage {
    base_key_usage,
    extended_key_usage,
    unknown_extended_key_usages,
});

object_field!(BaseKeyUsage {
    digital_signature,
    content_commitment,
    key_encipherment,
    data_encipherment,
    key_agreement,
    cert_sign,
    crl_sign,
    encipher_only,
    decipher_only,
});

object_field!(ExtendedKeyUsage {
    server_auth,
    client_auth,
    code_signing,
    email_protection,
    time_stamping,
    ocsp_signing,
});

object_field!(CaOptions {
    is_ca,
    max_issuer_path_length,
    zero_max_issuer_path_length,
});

object_field!(PublicKey { key, format });

object_field!(SubordinateConfigPemIssuerChain { pem_certificates });

object_field!(AccessUrls {
    ca_certificate_access_url,
    crl_access_urls,
});

object_field!(CertificateDescription {
    subject_description,
    x509_description,
    public_key,
    subject_key_id,
    authority_key_id,
    crl_distribution_points,
    aia_issuing_certificate_urls,
    cert_fingerprint,
});

object_field!(SubjectDescription {
    subject,
    subject_alt_name,
    hex_serial_number,
    lifetime,
    not_before_time,
    not_after_time,
});

object_field!(KeyId { key_id });

object_field!(CertificateFingerprint { sha256_hash });

// One-of groups: an arm set in desired keeps the other arm from being
// inherited from the observed value.

impl KeySpec {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Field for KeySpec {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ) {
        differ.diff_field(
            &self.cloud_kms_key_version,
            &actual.cloud_kms_key_version,
            info,
            path.nest("CloudKmsKeyVersion"),
        );
        differ.diff_field(&self.algorithm, &actual.algorithm, info, path.nest("Algorithm"));
    }

    fn canonicalize_desired(&self, initial: &Self) -> Self {
        let cloud_kms_key_version = if self.algorithm.is_some() {
            self.cloud_kms_key_version.clone()
        } else {
            canonical_reference_desired(&self.cloud_kms_key_version, &initial.cloud_kms_key_version)
        };
        let algorithm = if self.cloud_kms_key_version.is_some() {
            self.algorithm.clone()
        } else {
            canonical_desired(&self.algorithm, &initial.algorithm)
        };
        Self {
            cloud_kms_key_version,
            algorithm,
        }
    }

    fn canonicalize_new(&self, desired: &Self) -> Self {
        Self {
            cloud_kms_key_version: canonical_reference_new(
                &self.cloud_kms_key_version,
                &desired.cloud_kms_key_version,
            ),
            algorithm: canonical_new(&self.algorithm, &desired.algorithm),
        }
    }
}

impl SubordinateConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Field for SubordinateConfig {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ) {
        differ.diff_field(
            &self.certificate_authority,
            &actual.certificate_authority,
            info,
            path.nest("CertificateAuthority"),
        );
        differ.diff_field(
            &self.pem_issuer_chain,
            &actual.pem_issuer_chain,
            info,
            path.nest("PemIssuerChain"),
        );
    }

    fn canonicalize_desired(&self, initial: &Self) -> Self {
        let certificate_authority = if self.pem_issuer_chain.is_some() {
            self.certificate_authority.clone()
        } else {
            canonical_reference_desired(&self.certificate_authority, &initial.certificate_authority)
        };
        let pem_issuer_chain = if self.certificate_authority.is_some() {
            self.pem_issuer_chain.clone()
        } else {
            canonical_desired(&self.pem_issuer_chain, &initial.pem_issuer_chain)
        };
        Self {
            certificate_authority,
            pem_issuer_chain,
        }
    }

    fn canonicalize_new(&self, desired: &Self) -> Self {
        Self {
            certificate_authority: canonical_reference_new(
                &self.certificate_authority,
                &desired.certificate_authority,
            ),
            pem_issuer_chain: canonical_new(&self.pem_issuer_chain, &desired.pem_issuer_chain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_names_are_upper_camel_case() {
        assert_eq!(member_name("subject_alt_name"), "SubjectAltName");
        assert_eq!(member_name("x509_config"), "X509Config");
        assert_eq!(member_name("is_ca"), "IsCa");
    }

    #[test]
    fn nested_diff_paths() {
        let desired = Config {
            subject_config: Some(SubjectConfig {
                subject: Some(Subject {
                    common_name: Some("new".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let actual = Config {
            subject_config: Some(SubjectConfig {
                subject: Some(Subject {
                    common_name: Some("old".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let mut differ = Differ::new();
        differ.diff_field(
            &Some(desired),
            &Some(actual),
            DiffInfo::recreate(),
            FieldPath::root().nest("Config"),
        );
        let diffs = differ.into_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].field_name.as_str(),
            "Config.SubjectConfig.Subject.CommonName"
        );
        assert!(diffs[0].requires_recreate());
    }

    #[test]
    fn list_element_paths() {
        let oid = |path: Vec<i64>| ObjectId {
            object_id_path: Some(path),
        };
        let desired = X509Config {
            policy_ids: Some(vec![oid(vec![1, 2, 3]), oid(vec![1, 2, 4])]),
            ..Default::default()
        };
        let actual = X509Config {
            policy_ids: Some(vec![oid(vec![1, 2, 3]), oid(vec![1, 2, 5])]),
            ..Default::default()
        };

        let mut differ = Differ::new();
        desired.compare(
            &actual,
            DiffInfo::recreate(),
            &FieldPath::root().nest("X509Config"),
            &mut differ,
        );
        let diffs = differ.into_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].field_name.as_str(),
            "X509Config.PolicyIds[1].ObjectIdPath[2]"
        );
    }

    #[test]
    fn output_only_member_is_copied_from_observed() {
        let desired = Config::default();
        let observed = Config {
            public_key: Some(PublicKey {
                key: Some("a2V5".to_string()),
                format: Some(KeyFormat::Pem),
            }),
            ..Default::default()
        };
        assert_eq!(desired.canonicalize_desired(&observed), observed);

        let mut differ = Differ::new();
        Config {
            public_key: Some(PublicKey::default()),
            ..Default::default()
        }
        .compare(&observed, DiffInfo::recreate(), &FieldPath::root(), &mut differ);
        assert!(differ.is_empty());
    }

    #[test]
    fn key_spec_arm_set_in_desired_blocks_inheritance() {
        let desired = KeySpec {
            algorithm: Some(SignHashAlgorithm::EcP256Sha256),
            cloud_kms_key_version: None,
        };
        let observed = KeySpec {
            algorithm: None,
            cloud_kms_key_version: Some("projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/1".to_string()),
        };
        let canonical = desired.canonicalize_desired(&observed);
        assert_eq!(canonical, desired);
    }

    #[test]
    fn key_spec_inherits_when_unset() {
        let observed = KeySpec {
            algorithm: Some(SignHashAlgorithm::EcP256Sha256),
            cloud_kms_key_version: None,
        };
        assert_eq!(KeySpec::default().canonicalize_desired(&observed), observed);
    }

    #[test]
    fn subordinate_arm_set_in_desired_blocks_inheritance() {
        let desired = SubordinateConfig {
            certificate_authority: None,
            pem_issuer_chain: Some(SubordinateConfigPemIssuerChain {
                pem_certificates: Some(vec!["-----BEGIN CERTIFICATE-----".to_string()]),
            }),
        };
        let observed = SubordinateConfig {
            certificate_authority: Some(
                "projects/p/locations/l/caPools/pool/certificateAuthorities/root-ca".to_string(),
            ),
            pem_issuer_chain: None,
        };
        assert_eq!(desired.canonicalize_desired(&observed), desired);

        let desired = SubordinateConfig {
            certificate_authority: Some("other-root".to_string()),
            pem_issuer_chain: None,
        };
        let observed = SubordinateConfig {
            certificate_authority: None,
            pem_issuer_chain: Some(SubordinateConfigPemIssuerChain {
                pem_certificates: Some(vec!["-----BEGIN CERTIFICATE-----".to_string()]),
            }),
        };
        assert_eq!(desired.canonicalize_desired(&observed), desired);
    }

    #[test]
    fn subordinate_inherits_when_unset() {
        let observed = SubordinateConfig {
            certificate_authority: Some("root-ca".to_string()),
            pem_issuer_chain: None,
        };
        assert_eq!(SubordinateConfig::default().canonicalize_desired(&observed), observed);
    }

    #[test]
    fn subordinate_issuer_short_name_is_equivalent() {
        let desired = SubordinateConfig {
            certificate_authority: Some("root-ca".to_string()),
            pem_issuer_chain: None,
        };
        let observed = SubordinateConfig {
            certificate_authority: Some(
                "projects/p/locations/l/caPools/pool/certificateAuthorities/root-ca".to_string(),
            ),
            pem_issuer_chain: None,
        };

        let canonical = desired.canonicalize_desired(&observed);
        assert_eq!(canonical, observed);

        let mut differ = Differ::new();
        canonical.compare(&observed, DiffInfo::recreate(), &FieldPath::root(), &mut differ);
        assert!(differ.is_empty());

        assert_eq!(observed.canonicalize_new(&desired), desired);
    }

    #[test]
    fn empty_objects_keep_desired_representation() {
        let desired = ExtendedKeyUsage::default();
        let new = ExtendedKeyUsage::default();
        assert_eq!(new.canonicalize_new(&desired), desired);
        assert!(desired.is_zero());
    }
}
