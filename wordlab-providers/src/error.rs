//! Provider error types

use thiserror::Error;
use wordlab_core::ProviderId;

/// Errors raised while sampling a word from a model provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No provider is registered for this id
    #[error("No provider registered for '{0}'")]
    UnknownProvider(ProviderId),

    /// The call did not finish before the request timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Normalisation left nothing of the model's answer
    #[error("Model returned no usable word (raw: {raw:?})")]
    EmptyResponse { raw: String },

    /// The provider answered with an error status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport failure. The request URL is stripped from the source error.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API key has an invalid format for {0}")]
    InvalidKeyFormat(ProviderId),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.without_url())
    }
}

impl ProviderError {
    /// Whether the error only affects the current sample.
    ///
    /// Per-sample errors are counted and skipped by the runner. Anything else
    /// means the experiment itself is misconfigured.
    pub fn is_per_sample(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout(_)
                | ProviderError::EmptyResponse { .. }
                | ProviderError::Api { .. }
                | ProviderError::Network(_)
                | ProviderError::InvalidResponse(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }

    /// Build an `Api` error from a non-success response body.
    ///
    /// All three vendors nest the human-readable text under `error.message`;
    /// anything else is kept verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        ProviderError::Api { status, message }
    }
}
