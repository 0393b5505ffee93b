use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wordlab_core::{ProviderId, ONE_WORD_SYSTEM_PROMPT};

use super::HttpTransport;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{ModelProvider, RawCompletion, SampleParams};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    transport: HttpTransport,
}

impl AnthropicProvider {
    pub fn new() -> ProviderResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> ProviderResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(base_url)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    temperature: f64,
    top_k: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn validate_key_format(&self, api_key: &str) -> bool {
        api_key.starts_with("sk-ant-") && api_key.len() > 20
    }

    async fn sample(&self, params: &SampleParams, api_key: &str) -> ProviderResult<RawCompletion> {
        let body = MessagesRequest {
            model: &params.model,
            max_tokens: params.max_tokens,
            system: ONE_WORD_SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: &params.stimulus,
            }],
            temperature: params.temperature,
            top_k: params.top_k,
        };

        let url = self.transport.url("v1/messages")?;
        let request = self
            .transport
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let response: MessagesResponse = HttpTransport::send_json(request).await?;

        let text = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no content blocks".to_string()))?
            .text
            .unwrap_or_default();

        let mut completion = RawCompletion::new(text);
        if let Some(usage) = response.usage {
            completion = completion.with_usage(usage.input_tokens, usage.output_tokens);
        }
        Ok(completion)
    }
}
