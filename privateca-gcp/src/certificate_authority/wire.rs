//! Request bodies and response decoding
//!
//! `expand` turns the typed resource into a request body, `flatten` turns a
//! response body back into the typed resource.

use heck::ToLowerCamelCase;
use privateca_core::canonical::short_name;
use privateca_core::provider::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CaOptions, CertificateAuthority};

/// Fields that only appear in the request URL
const URL_PARAMS: &[&str] = &["name", "project", "location", "caPool"];

/// Top-level fields the server populates
const OUTPUT_ONLY: &[&str] = &[
    "tier",
    "state",
    "pemCaCertificates",
    "caCertificateDescriptions",
    "accessUrls",
    "createTime",
    "updateTime",
    "deleteTime",
    "expireTime",
];

/// JSON shape of [`CaOptions`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaOptionsWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    is_ca: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_issuer_path_length: Option<i64>,
}

impl From<CaOptionsWire> for CaOptions {
    fn from(wire: CaOptionsWire) -> Self {
        match wire.max_issuer_path_length {
            Some(0) => CaOptions {
                is_ca: wire.is_ca,
                max_issuer_path_length: None,
                zero_max_issuer_path_length: Some(true),
            },
            max => CaOptions {
                is_ca: wire.is_ca,
                max_issuer_path_length: max,
                zero_max_issuer_path_length: None,
            },
        }
    }
}

impl From<CaOptions> for CaOptionsWire {
    fn from(options: CaOptions) -> Self {
        let max_issuer_path_length = if options.zero_max_issuer_path_length == Some(true) {
            Some(0)
        } else {
            options.max_issuer_path_length
        };
        CaOptionsWire {
            is_ca: options.is_ca,
            max_issuer_path_length,
        }
    }
}

fn to_object(ca: &CertificateAuthority) -> ProviderResult<Map<String, Value>> {
    match serde_json::to_value(ca) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::Serialization(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(ProviderError::Serialization(e.to_string())),
    }
}

/// Request body for create: unset, output-only and URL fields are omitted
pub fn expand(ca: &CertificateAuthority) -> ProviderResult<Value> {
    let mut body = to_object(ca)?;
    for key in URL_PARAMS.iter().chain(OUTPUT_ONLY) {
        body.remove(*key);
    }
    if let Some(Value::Object(config)) = body.get_mut("config") {
        config.remove("publicKey");
    }
    Ok(Value::Object(body))
}

/// Request body for a PATCH carrying only the fields in `update_mask`.
///
/// A masked field that is unset is sent as an empty value so the server
/// clears it.
pub fn expand_update(ca: &CertificateAuthority, update_mask: &[String]) -> ProviderResult<Value> {
    let full = to_object(ca)?;
    let mut body = Map::new();
    for field in update_mask {
        let key = field.to_lower_camel_case();
        let value = full
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        body.insert(key, value);
    }
    Ok(Value::Object(body))
}

/// Typed resource from a response body.
///
/// The name is reduced to the short id; project, location and CA pool come
/// from `request`. Unknown keys are ignored.
pub fn flatten(value: Value, request: &CertificateAuthority) -> ProviderResult<CertificateAuthority> {
    let mut ca: CertificateAuthority = serde_json::from_value(value).map_err(|e| {
        ProviderError::Serialization(format!("Invalid CertificateAuthority: {e}"))
    })?;

    ca.name = ca
        .name
        .as_deref()
        .map(|n| short_name(n).to_string())
        .or_else(|| request.name.clone());
    ca.project = request.project.clone();
    ca.location = request.location.clone();
    ca.ca_pool = request.ca_pool.clone();
    Ok(ca)
}

/// One page of a list call
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCertificateAuthoritiesResponse {
    #[serde(default)]
    pub certificate_authorities: Vec<Value>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::super::testdata::{observed_root_ca, root_ca};
    use super::super::{CertificateAuthorityType, State, Tier};
    use super::*;
    use serde_json::json;

    #[test]
    fn expand_omits_url_params_and_output_only_fields() {
        let body = expand(&observed_root_ca()).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "SELF_SIGNED",
                "config": {
                    "subjectConfig": {
                        "subject": {"commonName": "Example Root", "organization": "Example Org"}
                    },
                    "x509Config": {
                        "keyUsage": {"baseKeyUsage": {"certSign": true, "crlSign": true}},
                        "caOptions": {"isCa": true}
                    }
                },
                "lifetime": "315360000s",
                "keySpec": {"algorithm": "RSA_PKCS1_4096_SHA256"},
                "labels": {"env": "prod"}
            })
        );
    }

    #[test]
    fn zero_path_length_is_sent_explicitly() {
        let mut ca = root_ca();
        if let Some(x509) = ca.config.as_mut().and_then(|c| c.x509_config.as_mut()) {
            x509.ca_options = Some(CaOptions {
                is_ca: Some(true),
                max_issuer_path_length: None,
                zero_max_issuer_path_length: Some(true),
            });
        }
        let body = expand(&ca).unwrap();
        assert_eq!(
            body["config"]["x509Config"]["caOptions"],
            json!({"isCa": true, "maxIssuerPathLength": 0})
        );
    }

    #[test]
    fn expand_update_sends_only_masked_fields() {
        let body = expand_update(&root_ca(), &["labels".to_string()]).unwrap();
        assert_eq!(body, json!({"labels": {"env": "prod"}}));

        let mut ca = root_ca();
        ca.labels = None;
        let body = expand_update(&ca, &["labels".to_string()]).unwrap();
        assert_eq!(body, json!({"labels": {}}));
    }

    #[test]
    fn flatten_fixes_identity_and_keeps_unknown_enums() {
        let response = json!({
            "name": "projects/my-project/locations/us-central1/caPools/my-pool/certificateAuthorities/root-ca",
            "type": "SELF_SIGNED",
            "tier": "ENTERPRISE",
            "state": "SOMETHING_NEW",
            "lifetime": "315360000s",
            "keySpec": {"algorithm": "RSA_PKCS1_4096_SHA256"},
            "config": {
                "x509Config": {"caOptions": {"isCa": true, "maxIssuerPathLength": 0}}
            },
            "createTime": "2024-05-01T10:00:00.123456Z",
            "someFutureField": {"x": 1}
        });

        let ca = flatten(response, &root_ca()).unwrap();
        assert_eq!(ca.name.as_deref(), Some("root-ca"));
        assert_eq!(ca.project.as_deref(), Some("my-project"));
        assert_eq!(ca.ca_pool.as_deref(), Some("my-pool"));
        assert_eq!(ca.ca_type, Some(CertificateAuthorityType::SelfSigned));
        assert_eq!(ca.tier, Some(Tier::Enterprise));
        assert_eq!(ca.state, Some(State::Unrecognized("SOMETHING_NEW".to_string())));
        assert!(ca.create_time.is_some());

        let ca_options = ca.config.unwrap().x509_config.unwrap().ca_options.unwrap();
        assert_eq!(ca_options.zero_max_issuer_path_length, Some(true));
        assert_eq!(ca_options.max_issuer_path_length, None);
    }

    #[test]
    fn flatten_rejects_malformed_body() {
        let err = flatten(json!({"labels": "not-a-map"}), &root_ca()).unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }
}
