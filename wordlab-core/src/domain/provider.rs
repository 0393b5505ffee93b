use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use super::pricing::ModelCatalog;

/// Instruction sent with every sampling request. Providers must answer with a
/// single word; this is not configurable.
pub const ONE_WORD_SYSTEM_PROMPT: &str = "You are participating in a word association study. \
Respond with exactly one word. Do not add punctuation, explanations, or any other text.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Anthropic,
    Google,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAI, ProviderId::Anthropic, ProviderId::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
        }
    }

    /// Best-effort provider inference from a bare model name.
    pub fn infer_from_model(model: &str) -> Option<Self> {
        let model = model.to_ascii_lowercase();
        if model.starts_with("gpt-")
            || model.starts_with("chatgpt")
            || model.starts_with("o1")
            || model.starts_with("o3")
            || model.starts_with("o4")
        {
            Some(ProviderId::OpenAI)
        } else if model.starts_with("claude") {
            Some(ProviderId::Anthropic)
        } else if model.starts_with("gemini") || model.starts_with("gemma") {
            Some(ProviderId::Google)
        } else {
            None
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAI),
            "anthropic" => Ok(ProviderId::Anthropic),
            "google" | "gemini" => Ok(ProviderId::Google),
            other => Err(CoreError::Validation(format!("unknown provider '{}'", other))),
        }
    }
}

/// A model selected for an experiment, qualified by the provider serving it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ModelSpec {
    pub provider: ProviderId,
    pub model: String,
}

impl ModelSpec {
    pub fn new(provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Accepts `provider/model`, or a bare model name that is either in the
/// catalog or carries a recognisable vendor prefix.
impl FromStr for ModelSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((provider, model)) = s.split_once('/') {
            if model.is_empty() {
                return Err(CoreError::Validation(format!("missing model name in '{}'", s)));
            }
            return Ok(Self::new(provider.parse()?, model));
        }

        if s.is_empty() {
            return Err(CoreError::Validation("empty model identifier".to_string()));
        }

        ModelCatalog::lookup(s)
            .map(|info| info.provider)
            .or_else(|| ProviderId::infer_from_model(s))
            .map(|provider| Self::new(provider, s))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "cannot determine provider for model '{}'; use provider/model",
                    s
                ))
            })
    }
}

/// Bring-your-own-key credentials, keyed by provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    keys: HashMap<ProviderId, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: ProviderId, key: impl Into<String>) -> Self {
        self.insert(provider, key);
        self
    }

    pub fn insert(&mut self, provider: ProviderId, key: impl Into<String>) {
        let key = key.into();
        if !key.trim().is_empty() {
            self.keys.insert(provider, key);
        }
    }

    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.keys.contains_key(&provider)
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        let mut providers: Vec<ProviderId> = self.keys.keys().copied().collect();
        providers.sort();
        providers
    }

    /// Providers from `required` with no key, deduplicated, in input order.
    pub fn missing_for(&self, required: impl IntoIterator<Item = ProviderId>) -> Vec<ProviderId> {
        let mut missing = Vec::new();
        for provider in required {
            if !self.contains(provider) && !missing.contains(&provider) {
                missing.push(provider);
            }
        }
        missing
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.providers().into_iter().map(|p| (p, "<redacted>")))
            .finish()
    }
}

impl FromIterator<(ProviderId, String)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (ProviderId, String)>>(iter: I) -> Self {
        let mut credentials = Credentials::new();
        for (provider, key) in iter {
            credentials.insert(provider, key);
        }
        credentials
    }
}
