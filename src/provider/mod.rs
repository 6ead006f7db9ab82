//! Outbound transport to the generative-model provider.
//!
//! [`GenerateTransport`] is the seam between the orchestrator and the
//! network; tests substitute mock transports, production uses
//! [`HttpTransport`]. Credentials come from a [`CredentialStore`] — the
//! orchestrator never mutates them, only reads.

pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{GenError, Result};
use wire::{GenerateContentRequest, GenerateContentResponse};

/// Default base URL for the provider API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Read-only source of the provider API key.
///
/// External collaborator: implementations typically wrap the platform's
/// secure key storage and cache the key in memory after first load.
pub trait CredentialStore: Send + Sync {
    /// Current API key, or `None` when no key has been configured.
    fn api_key(&self) -> Option<String>;
}

/// [`CredentialStore`] holding a fixed key, for tests and simple setups.
pub struct StaticCredentials(String);

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self(api_key.into())
    }
}

impl CredentialStore for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// One network attempt against the provider.
///
/// Implementations map transport and HTTP failures into the [`GenError`]
/// taxonomy; the retry executor decides what to do with them.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// HTTP transport for the provider's `generateContent` endpoint.
///
/// One POST per attempt. The API key travels in an `Authorization: Bearer`
/// header — never a URL query parameter, which leaks through logs and
/// proxies.
pub struct HttpTransport {
    credentials: Box<dyn CredentialStore>,
    http: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with the default provider URL.
    pub fn new(credentials: impl CredentialStore + 'static) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Create a transport with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        credentials: impl CredentialStore + 'static,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            credentials: Box::new(credentials),
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GenerateTransport for HttpTransport {
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.credentials.api_key().ok_or(GenError::Unauthorized)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(body)
            .send()
            .await
            .map_err(|e| GenError::classify(None, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Honour a retry-after hint before consuming the body.
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let message = response.text().await.unwrap_or_default();
            let err = GenError::classify(Some(status.as_u16()), &message);
            return Err(match err {
                GenError::RateLimited { .. } => GenError::RateLimited { retry_after },
                other => other,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenError::Unknown {
                message: format!("malformed provider response: {e}"),
            })
    }
}
