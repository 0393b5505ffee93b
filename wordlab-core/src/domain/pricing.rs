use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::provider::{ModelSpec, ProviderId, ONE_WORD_SYSTEM_PROMPT};

/// Output tokens assumed per call when estimating an experiment up front.
pub const ESTIMATED_OUTPUT_TOKENS: u32 = 3;

/// Static description of a known model. Prices are USD per 1k tokens, stored
/// as millionths of a dollar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub provider: ProviderId,
    pub display_name: &'static str,
    input_micros_per_1k: i64,
    output_micros_per_1k: i64,
}

impl ModelInfo {
    const fn new(
        id: &'static str,
        provider: ProviderId,
        display_name: &'static str,
        input_micros_per_1k: i64,
        output_micros_per_1k: i64,
    ) -> Self {
        Self {
            id,
            provider,
            display_name,
            input_micros_per_1k,
            output_micros_per_1k,
        }
    }

    pub fn pricing(&self) -> ModelPricing {
        ModelPricing {
            input_cost_per_1k: Decimal::new(self.input_micros_per_1k, 6),
            output_cost_per_1k: Decimal::new(self.output_micros_per_1k, 6),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelPricing {
    pub input_cost_per_1k: Decimal,
    pub output_cost_per_1k: Decimal,
}

impl ModelPricing {
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> Decimal {
        let thousand = Decimal::from(1000);
        Decimal::from(input_tokens) / thousand * self.input_cost_per_1k
            + Decimal::from(output_tokens) / thousand * self.output_cost_per_1k
    }
}

const CATALOG: &[ModelInfo] = &[
    ModelInfo::new("gpt-4o", ProviderId::OpenAI, "GPT-4o", 2_500, 10_000),
    ModelInfo::new("gpt-4o-mini", ProviderId::OpenAI, "GPT-4o mini", 150, 600),
    ModelInfo::new("gpt-4-turbo", ProviderId::OpenAI, "GPT-4 Turbo", 10_000, 30_000),
    ModelInfo::new("gpt-3.5-turbo", ProviderId::OpenAI, "GPT-3.5 Turbo", 500, 1_500),
    ModelInfo::new(
        "claude-3-5-sonnet-20241022",
        ProviderId::Anthropic,
        "Claude 3.5 Sonnet",
        3_000,
        15_000,
    ),
    ModelInfo::new(
        "claude-3-5-haiku-20241022",
        ProviderId::Anthropic,
        "Claude 3.5 Haiku",
        800,
        4_000,
    ),
    ModelInfo::new("claude-3-opus-20240229", ProviderId::Anthropic, "Claude 3 Opus", 15_000, 75_000),
    ModelInfo::new("claude-3-haiku-20240307", ProviderId::Anthropic, "Claude 3 Haiku", 250, 1_250),
    ModelInfo::new("gemini-1.5-pro", ProviderId::Google, "Gemini 1.5 Pro", 1_250, 5_000),
    ModelInfo::new("gemini-1.5-flash", ProviderId::Google, "Gemini 1.5 Flash", 75, 300),
    ModelInfo::new("gemini-2.0-flash", ProviderId::Google, "Gemini 2.0 Flash", 100, 400),
];

pub struct ModelCatalog;

impl ModelCatalog {
    pub fn all() -> &'static [ModelInfo] {
        CATALOG
    }

    pub fn lookup(model: &str) -> Option<&'static ModelInfo> {
        CATALOG.iter().find(|info| info.id.eq_ignore_ascii_case(model))
    }

    pub fn for_provider(provider: ProviderId) -> impl Iterator<Item = &'static ModelInfo> {
        CATALOG.iter().filter(move |info| info.provider == provider)
    }

    pub fn pricing(model: &str) -> Option<ModelPricing> {
        Self::lookup(model).map(|info| info.pricing())
    }
}

/// Cost of one call. Unknown models cost nothing; estimation is best-effort.
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> Decimal {
    ModelCatalog::pricing(model)
        .map(|pricing| pricing.cost(input_tokens, output_tokens))
        .unwrap_or(Decimal::ZERO)
}

/// Rough token count for text a provider did not meter: one token per four
/// characters, rounded up.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.div_ceil(4)
}

/// Up-front estimate for a whole experiment.
pub fn estimate_experiment_cost(
    models: &[ModelSpec],
    stimulus: &str,
    calls_per_model: u64,
) -> Decimal {
    let input_tokens = estimate_tokens(ONE_WORD_SYSTEM_PROMPT) + estimate_tokens(stimulus);
    models
        .iter()
        .map(|spec| {
            estimate_cost(&spec.model, input_tokens, ESTIMATED_OUTPUT_TOKENS)
                * Decimal::from(calls_per_model)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cost_formula() {
        // gpt-4o-mini: $0.00015 in / $0.0006 out per 1k
        let cost = estimate_cost("gpt-4o-mini", 1000, 1000);
        assert_eq!(cost, Decimal::new(750, 6));

        let cost = estimate_cost("gpt-4o-mini", 2000, 500);
        assert_eq!(cost, Decimal::new(600, 6));
    }

    #[test]
    fn test_unknown_model_costs_zero() {
        assert_eq!(estimate_cost("llama-local", 5000, 5000), Decimal::ZERO);
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(ModelCatalog::lookup("GPT-4o").is_some());
        assert_eq!(ModelCatalog::lookup("gemini-1.5-flash").unwrap().provider, ProviderId::Google);
    }

    #[test]
    fn test_every_provider_has_catalog_entries() {
        for provider in ProviderId::ALL {
            assert!(ModelCatalog::for_provider(provider).count() > 0);
        }
    }

    #[test]
    fn test_experiment_estimate_scales_with_calls() {
        let models = vec![ModelSpec::new(ProviderId::OpenAI, "gpt-4o")];
        let one = estimate_experiment_cost(&models, "ocean", 1);
        let ten = estimate_experiment_cost(&models, "ocean", 10);
        assert!(one > Decimal::ZERO);
        assert_eq!(one * Decimal::from(10), ten);
    }
}
