use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wordlab_core::{ProviderId, ONE_WORD_SYSTEM_PROMPT};

use super::HttpTransport;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{ModelProvider, RawCompletion, SampleParams};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const KEY_PREFIX: &str = "AIza";
const KEY_LENGTH: usize = 39;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GoogleProvider {
    transport: HttpTransport,
}

impl GoogleProvider {
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn validate_key_format(&self, api_key: &str) -> bool {
        api_key.starts_with(KEY_PREFIX) && api_key.len() == KEY_LENGTH
    }

    async fn sample(&self, params: &SampleParams, api_key: &str) -> ProviderResult<RawCompletion> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: ONE_WORD_SYSTEM_PROMPT,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part {
                    text: &params.stimulus,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_k: params.top_k,
                max_output_tokens: params.max_tokens,
            },
        };

        let url = self
            .transport
            .url(&format!("v1beta/models/{}:generateContent", params.model))?;
        let request = self
            .transport
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&body);
        let response: GenerateResponse = HttpTransport::send_json(request).await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no candidates".to_string()))?;

        // A candidate blocked by safety filters carries no content at all.
        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_default();

        let mut completion = RawCompletion::new(text);
        if let Some(usage) = response.usage_metadata {
            completion.input_tokens = usage.prompt_token_count;
            completion.output_tokens = usage.candidates_token_count;
        }
        Ok(completion)
    }
}
