//! REST client for the Certificate Authority Service API
//!
//! Thin transport used by the resource code: bearer authentication, JSON
//! bodies, Google error decoding and retries of transient failures.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use privateca_core::provider::{ProviderError, ProviderResult};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::retry::retry_with_backoff;

/// Google API error body (`{"error": {"code", "message", "status"}}`)
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Token returned by the GCE metadata server
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: Option<u64>,
}

/// Lifetime assumed when the metadata server omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
/// A cached token is replaced this long before it expires
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct PrivateCaClient {
    http: Client,
    config: ClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for PrivateCaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateCaClient")
            .field("base_path", &self.config.base_path)
            .finish_non_exhaustive()
    }
}

impl PrivateCaClient {
    pub fn new(config: ClientConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    /// Configured token, or a metadata-server token refreshed shortly before it expires
    async fn access_token(&self) -> ProviderResult<String> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let response = self.fetch_metadata_token().await?;
        let lifetime = response
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn fetch_metadata_token(&self) -> ProviderResult<TokenResponse> {
        debug!("Requesting access token from {}", self.config.metadata_token_url);
        let response = self
            .http
            .get(&self.config.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                ProviderError::Configuration(format!(
                    "No access token configured and the metadata server is unreachable: {e}"
                ))
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Configuration(format!(
                "Metadata server refused the token request with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(format!("Invalid token response: {e}")))?;
        info!("Retrieved access token from metadata server");
        Ok(token)
    }

    /// Send a request, retrying transient failures, and decode the JSON reply.
    ///
    /// An empty reply body decodes to `Value::Null`.
    pub async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> ProviderResult<Value> {
        let operation = format!("{method} {url}");
        retry_with_backoff(
            &self.config.retry,
            &operation,
            ProviderError::is_transient,
            || self.send_once(method.clone(), url, body),
        )
        .await
    }

    async fn send_once(&self, method: Method, url: &str, body: Option<&Value>) -> ProviderResult<Value> {
        let token = self.access_token().await?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(decode_error(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::Serialization(format!("Invalid response from {url}: {e}")))
    }
}

fn decode_error(status: reqwest::StatusCode, text: &str) -> ProviderError {
    match serde_json::from_str::<GoogleErrorResponse>(text) {
        Ok(body) => ProviderError::Api {
            code: body.error.code,
            status: body.error.status,
            message: body.error.message,
        },
        Err(_) => ProviderError::Api {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or_default().to_string(),
            message: text.to_string(),
        },
    }
}
