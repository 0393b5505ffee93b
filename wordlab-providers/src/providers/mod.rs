//! Vendor implementations of [`ModelProvider`](crate::ModelProvider).
//!
//! - **openai**: chat completions API, bearer auth
//! - **anthropic**: messages API, `x-api-key` auth
//! - **google**: Gemini `generateContent`, `x-goog-api-key` auth

pub mod anthropic;
pub mod google;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai::OpenAIProvider;

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

const USER_AGENT: &str = concat!("wordlab/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP plumbing for all vendors.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub(crate) fn new(base_url: &str) -> ProviderResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // The gateway applies the per-call timeout; this only bounds connection setup.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full URL for an endpoint path below the base URL.
    pub(crate) fn url(&self, path: &str) -> ProviderResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and decode a JSON body, mapping error statuses.
    pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ProviderResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %text, "Provider returned error status");
            return Err(ProviderError::from_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
