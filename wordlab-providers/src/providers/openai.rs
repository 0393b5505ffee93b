use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wordlab_core::{ProviderId, ONE_WORD_SYSTEM_PROMPT};

use super::HttpTransport;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{ModelProvider, RawCompletion, SampleParams};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    transport: HttpTransport,
}

impl OpenAIProvider {
    pub fn new() -> ProviderResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> ProviderResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url().as_str()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    fn validate_key_format(&self, api_key: &str) -> bool {
        api_key.starts_with("sk-") && api_key.len() > 20
    }

    async fn sample(&self, params: &SampleParams, api_key: &str) -> ProviderResult<RawCompletion> {
        // The chat completions API has no top-k sampling parameter.
        tracing::debug!(model = %params.model, top_k = params.top_k, "top_k is not supported by OpenAI, ignoring");

        let body = ChatRequest {
            model: &params.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: ONE_WORD_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &params.stimulus,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = self.transport.url("v1/chat/completions")?;
        let request = self.transport.post(url).bearer_auth(api_key).json(&body);
        let response: ChatResponse = HttpTransport::send_json(request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let mut completion = RawCompletion::new(text);
        if let Some(usage) = response.usage {
            completion = completion.with_usage(usage.prompt_tokens, usage.completion_tokens);
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("sk-abcdefghijklmnopqrstu", true; "valid")]
    #[test_case("sk-proj-abcdefghijklmnopqrstuvwxyz", true; "project key")]
    #[test_case("sk-short", false; "too short")]
    #[test_case("pk-abcdefghijklmnopqrstu", false; "wrong prefix")]
    #[test_case("", false; "empty")]
    fn test_validate_key_format(key: &str, expected: bool) {
        let provider = OpenAIProvider::new().unwrap();
        assert_eq!(provider.validate_key_format(key), expected);
    }
}
