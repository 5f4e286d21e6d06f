//! Validation of a desired Certificate Authority

use privateca_core::differ::FieldPath;
use privateca_core::validation::{Validate, ValidationError, Validator};

use super::*;

pub(super) fn validate(ca: &CertificateAuthority) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    ca.validate_fields(&FieldPath::root(), &mut v);
    v.finish()
}

/// Whether `s` is a protobuf duration in seconds (`"3600s"`, `"1.5s"`)
fn is_duration(s: &str) -> bool {
    let Some(number) = s.strip_suffix('s') else {
        return false;
    };
    let (seconds, fraction) = match number.split_once('.') {
        Some((seconds, fraction)) => (seconds, Some(fraction)),
        None => (number, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    digits(seconds) && fraction.is_none_or(|f| digits(f) && f.len() <= 9)
}

/// Reject enum values this crate does not know; `unknown` is the raw value
fn check_enum(v: &mut Validator, unknown: Option<&str>, path: FieldPath, allowed: &[&str]) {
    if let Some(value) = unknown {
        v.invalid(
            path,
            format!("unknown value {}, expected one of {}", value, allowed.join(", ")),
        );
    }
}

impl Validate for CertificateAuthority {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.name, path.nest("Name"));
        v.required(&self.project, path.nest("Project"));
        v.required(&self.location, path.nest("Location"));
        v.required(&self.ca_pool, path.nest("CaPool"));
        v.required(&self.ca_type, path.nest("Type"));
        v.required(&self.config, path.nest("Config"));
        v.required(&self.lifetime, path.nest("Lifetime"));
        v.required(&self.key_spec, path.nest("KeySpec"));

        check_enum(
            v,
            self.ca_type
                .as_ref()
                .filter(|t| t.is_unrecognized())
                .map(|t| t.as_str()),
            path.nest("Type"),
            CertificateAuthorityType::VALUES,
        );

        if let Some(lifetime) = &self.lifetime
            && !lifetime.is_empty()
            && !is_duration(lifetime)
        {
            v.invalid(
                path.nest("Lifetime"),
                format!("{lifetime:?} is not a duration in seconds such as \"315360000s\""),
            );
        }

        if self.ca_type == Some(CertificateAuthorityType::SelfSigned)
            && self.subordinate_config.as_ref().is_some_and(|s| !s.is_empty())
        {
            v.invalid(
                path.nest("SubordinateConfig"),
                "must not be set for a SELF_SIGNED certificate authority",
            );
        }

        v.nested(&self.config, path.nest("Config"));
        v.nested(&self.key_spec, path.nest("KeySpec"));
        v.nested(&self.subordinate_config, path.nest("SubordinateConfig"));
    }
}

impl Validate for Config {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.subject_config, path.nest("SubjectConfig"));
        v.required(&self.x509_config, path.nest("X509Config"));
        v.nested(&self.subject_config, path.nest("SubjectConfig"));
        v.nested(&self.x509_config, path.nest("X509Config"));
    }
}

impl Validate for SubjectConfig {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.subject, path.nest("Subject"));
        v.nested(&self.subject_alt_name, path.nest("SubjectAltName"));
    }
}

impl Validate for SubjectAltName {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.each(&self.custom_sans, path.nest("CustomSans"));
    }
}

impl Validate for X509Extension {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.object_id, path.nest("ObjectId"));
        v.required(&self.value, path.nest("Value"));
        v.nested(&self.object_id, path.nest("ObjectId"));
    }
}

impl Validate for ObjectId {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.object_id_path, path.nest("ObjectIdPath"));
    }
}

impl Validate for X509Config {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.nested(&self.key_usage, path.nest("KeyUsage"));
        v.each(&self.policy_ids, path.nest("PolicyIds"));
        v.each(&self.additional_extensions, path.nest("AdditionalExtensions"));
    }
}

impl Validate for KeyUsage {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.each(
            &self.unknown_extended_key_usages,
            path.nest("UnknownExtendedKeyUsages"),
        );
    }
}

impl Validate for KeySpec {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.exactly_one_of(
            path,
            &[
                ("CloudKmsKeyVersion", self.cloud_kms_key_version.is_some()),
                ("Algorithm", self.algorithm.is_some()),
            ],
        );
        check_enum(
            v,
            self.algorithm
                .as_ref()
                .filter(|a| a.is_unrecognized())
                .map(|a| a.as_str()),
            path.nest("Algorithm"),
            SignHashAlgorithm::VALUES,
        );
    }
}

impl Validate for SubordinateConfig {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.exactly_one_of(
            path,
            &[
                ("CertificateAuthority", self.certificate_authority.is_some()),
                ("PemIssuerChain", self.pem_issuer_chain.is_some()),
            ],
        );
        v.nested(&self.pem_issuer_chain, path.nest("PemIssuerChain"));
    }
}

impl Validate for SubordinateConfigPemIssuerChain {
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator) {
        v.required(&self.pem_certificates, path.nest("PemCertificates"));
    }
}

#[cfg(test)]
mod tests {
    use super::super::testdata::root_ca;
    use super::*;
    use privateca_core::validation::FieldError;

    #[test]
    fn valid_root_ca() {
        assert!(validate(&root_ca()).is_ok());
    }

    #[test]
    fn durations() {
        assert!(is_duration("315360000s"));
        assert!(is_duration("1.5s"));
        assert!(is_duration("0.000000001s"));
        assert!(!is_duration("0.0000000001s"));
        assert!(!is_duration("10y"));
        assert!(!is_duration("s"));
        assert!(!is_duration("1.s"));
    }

    #[test]
    fn reports_every_missing_required_field() {
        let err = validate(&CertificateAuthority::default()).unwrap_err();
        let fields: Vec<String> = err
            .errors
            .iter()
            .filter_map(|e| match e {
                FieldError::MissingRequired { field } => Some(field.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "Name", "Project", "Location", "CaPool", "Type", "Config", "Lifetime", "KeySpec"
            ]
        );
    }

    #[test]
    fn key_spec_needs_exactly_one_arm() {
        let mut ca = root_ca();
        ca.key_spec = Some(KeySpec {
            cloud_kms_key_version: Some("projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/1".to_string()),
            algorithm: Some(SignHashAlgorithm::EcP256Sha256),
        });
        let err = validate(&ca).unwrap_err();
        assert_eq!(
            err.errors,
            vec![FieldError::ExactlyOneOf {
                fields: vec![
                    "KeySpec.CloudKmsKeyVersion".to_string(),
                    "KeySpec.Algorithm".to_string()
                ],
                set: 2,
            }]
        );

        ca.key_spec = Some(KeySpec::default());
        assert!(validate(&ca).is_err());
    }

    #[test]
    fn subordinate_config_needs_exactly_one_arm() {
        let mut ca = root_ca();
        ca.ca_type = Some(CertificateAuthorityType::Subordinate);
        ca.subordinate_config = Some(SubordinateConfig::default());
        let err = validate(&ca).unwrap_err();
        assert!(matches!(err.errors[0], FieldError::ExactlyOneOf { set: 0, .. }));

        ca.subordinate_config = Some(SubordinateConfig {
            certificate_authority: Some("root-ca".to_string()),
            pem_issuer_chain: None,
        });
        assert!(validate(&ca).is_ok());
    }

    #[test]
    fn subordinate_without_issuer_is_accepted() {
        let mut ca = root_ca();
        ca.ca_type = Some(CertificateAuthorityType::Subordinate);
        assert!(validate(&ca).is_ok());
    }

    #[test]
    fn self_signed_rejects_subordinate_config() {
        let mut ca = root_ca();
        ca.subordinate_config = Some(SubordinateConfig {
            certificate_authority: Some("root-ca".to_string()),
            pem_issuer_chain: None,
        });
        let err = validate(&ca).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(err.to_string().contains("SubordinateConfig"));
    }

    #[test]
    fn nested_paths_in_errors() {
        let mut ca = root_ca();
        if let Some(x509) = ca.config.as_mut().and_then(|c| c.x509_config.as_mut()) {
            x509.additional_extensions = Some(vec![X509Extension {
                object_id: Some(ObjectId {
                    object_id_path: Some(vec![]),
                }),
                critical: Some(true),
                value: None,
            }]);
        }
        ca.lifetime = Some("ten years".to_string());

        let err = validate(&ca).unwrap_err();
        let messages: Vec<String> = err.errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("Invalid value for 'Lifetime'"));
        assert_eq!(
            messages[1],
            "Required field 'Config.X509Config.AdditionalExtensions[0].Value' is missing"
        );
        assert_eq!(
            messages[2],
            "Required field 'Config.X509Config.AdditionalExtensions[0].ObjectId.ObjectIdPath' is missing"
        );
    }

    #[test]
    fn unknown_enum_in_desired_state_is_rejected() {
        let mut ca = root_ca();
        ca.ca_type = Some(CertificateAuthorityType::Unrecognized("ROOT".to_string()));
        let err = validate(&ca).unwrap_err();
        assert!(err.to_string().contains("unknown value ROOT"));
    }
}
