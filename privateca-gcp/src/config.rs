//! Client configuration

use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_PATH: &str = "https://privateca.googleapis.com/v1/";

pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Environment variable overriding the API base path
pub const ENDPOINT_ENV: &str = "PRIVATECA_ENDPOINT";

/// Environment variable holding a ready-made OAuth2 access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Settings shared by every request a [`crate::PrivateCaClient`] sends
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, always ending in `/`
    pub base_path: String,
    pub user_agent: String,
    /// OAuth2 access token; fetched from the metadata server when unset
    pub access_token: Option<String>,
    pub metadata_token_url: String,
    pub request_timeout: Duration,
    pub operation_poll_interval: Duration,
    pub operation_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            user_agent: format!("privateca-rs/{}", env!("CARGO_PKG_VERSION")),
            access_token: None,
            metadata_token_url: METADATA_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            operation_poll_interval: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(600),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            config = config.with_base_path(endpoint);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            config = config.with_access_token(token);
        }
        config
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        self.base_path = base_path;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_metadata_token_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_token_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_operation_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.operation_poll_interval = interval;
        self.operation_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert!(config.access_token.is_none());
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn base_path_gets_trailing_slash() {
        let config = ClientConfig::new().with_base_path("http://localhost:8080/v1");
        assert_eq!(config.base_path, "http://localhost:8080/v1/");
    }

    #[test]
    fn from_lookup_reads_endpoint_and_token() {
        let env = HashMap::from([
            (ENDPOINT_ENV, "http://127.0.0.1:9000/v1"),
            (ACCESS_TOKEN_ENV, "ya29.token"),
        ]);
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_path, "http://127.0.0.1:9000/v1/");
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn from_lookup_ignores_empty_values() {
        let config = ClientConfig::from_lookup(|_| Some(String::new()));
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert!(config.access_token.is_none());
    }
}
