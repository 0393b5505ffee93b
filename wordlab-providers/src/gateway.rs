//! Dispatch of sampling calls to registered providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use wordlab_core::{estimate_tokens, ProviderId, ONE_WORD_SYSTEM_PROMPT};

use crate::error::{ProviderError, ProviderResult};
use crate::normalize::normalize_word;
use crate::provider::{ModelProvider, SampleParams, SampledWord};
use crate::rate_limit::{RateLimiter, DEFAULT_REQUESTS_PER_MINUTE};

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub requests_per_minute: u32,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            request_timeout: Duration::from_secs(30),
        }
    }
}

struct Registered {
    provider: Arc<dyn ModelProvider>,
    limiter: Arc<RateLimiter>,
}

/// Routes calls by [`ProviderId`], applying rate limiting, timeout,
/// normalisation and cost accounting.
///
/// The gateway is shared by every running experiment, so the per-provider
/// limiter spans experiments too.
pub struct ProviderGateway {
    config: GatewayConfig,
    providers: HashMap<ProviderId, Registered>,
}

impl ProviderGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Register or replace the provider for its id, with a fresh limiter.
    pub fn register(&mut self, provider: Arc<dyn ModelProvider>) {
        let id = provider.id();
        let limiter = Arc::new(RateLimiter::per_minute(self.config.requests_per_minute));
        tracing::debug!(provider = %id, interval_ms = limiter.interval().as_millis() as u64, "Registered provider");
        self.providers.insert(id, Registered { provider, limiter });
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn is_registered(&self, provider_id: ProviderId) -> bool {
        self.providers.contains_key(&provider_id)
    }

    pub fn registered(&self) -> Vec<ProviderId> {
        let mut ids: Vec<_> = self.providers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn provider(&self, provider_id: ProviderId) -> Option<Arc<dyn ModelProvider>> {
        self.providers
            .get(&provider_id)
            .map(|entry| Arc::clone(&entry.provider))
    }

    pub fn validate_key(&self, provider_id: ProviderId, api_key: &str) -> ProviderResult<bool> {
        let entry = self.entry(provider_id)?;
        Ok(entry.provider.validate_key_format(api_key))
    }

    /// Like [`validate_key`](Self::validate_key), but a malformed key is an
    /// `InvalidKeyFormat` error.
    pub fn ensure_valid_key(&self, provider_id: ProviderId, api_key: &str) -> ProviderResult<()> {
        if self.validate_key(provider_id, api_key)? {
            Ok(())
        } else {
            Err(ProviderError::InvalidKeyFormat(provider_id))
        }
    }

    /// Sample one word from `provider_id`.
    ///
    /// Waits for the provider's rate limiter first; the reported latency
    /// covers only the provider call itself.
    pub async fn sample(
        &self,
        provider_id: ProviderId,
        params: &SampleParams,
        api_key: &str,
    ) -> ProviderResult<SampledWord> {
        let entry = self.entry(provider_id)?;

        entry.limiter.acquire().await;

        let start = Instant::now();
        let completion = tokio::time::timeout(
            self.config.request_timeout,
            entry.provider.sample(params, api_key),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.config.request_timeout.as_millis() as u64))??;
        let latency_ms = start.elapsed().as_millis() as u64;

        let word = normalize_word(&completion.text).ok_or_else(|| ProviderError::EmptyResponse {
            raw: completion.text.clone(),
        })?;

        let input_tokens = completion.input_tokens.unwrap_or_else(|| {
            estimate_tokens(ONE_WORD_SYSTEM_PROMPT) + estimate_tokens(&params.stimulus)
        });
        let output_tokens = completion
            .output_tokens
            .unwrap_or_else(|| estimate_tokens(&completion.text));
        let cost = entry
            .provider
            .estimate_cost(&params.model, input_tokens, output_tokens);

        tracing::debug!(
            provider = %provider_id,
            model = %params.model,
            word = %word,
            latency_ms,
            input_tokens,
            output_tokens,
            "Sampled word"
        );

        Ok(SampledWord {
            word,
            raw: completion.text,
            input_tokens,
            output_tokens,
            cost,
            latency_ms,
        })
    }

    fn entry(&self, provider_id: ProviderId) -> ProviderResult<&Registered> {
        self.providers
            .get(&provider_id)
            .ok_or(ProviderError::UnknownProvider(provider_id))
    }
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("config", &self.config)
            .field("providers", &self.registered())
            .finish()
    }
}
