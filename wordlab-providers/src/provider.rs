use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wordlab_core::{ExperimentConfig, ProviderId};

use crate::error::ProviderResult;

/// One sampling request: a stimulus sent to a model under one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleParams {
    pub model: String,
    pub stimulus: String,
    pub temperature: f64,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl SampleParams {
    pub fn new(
        model: impl Into<String>,
        stimulus: impl Into<String>,
        config: ExperimentConfig,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            stimulus: stimulus.into(),
            temperature: config.temperature,
            top_k: config.top_k,
            max_tokens,
        }
    }

    pub fn config(&self) -> ExperimentConfig {
        ExperimentConfig::new(self.temperature, self.top_k)
    }
}

/// Text and usage exactly as a provider reported them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCompletion {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl RawCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }
}

/// A normalised word with the accounting the runner needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledWord {
    pub word: String,
    pub raw: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: Decimal,
    pub latency_ms: u64,
}

/// A vendor that can answer a stimulus with a single word.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Purely syntactic check; never contacts the vendor.
    fn validate_key_format(&self, api_key: &str) -> bool;

    async fn sample(&self, params: &SampleParams, api_key: &str) -> ProviderResult<RawCompletion>;

    fn estimate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> Decimal {
        wordlab_core::estimate_cost(model, input_tokens, output_tokens)
    }
}
