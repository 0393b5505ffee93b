use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{ExperimentId, SampleId};
use super::provider::ProviderId;

/// One realised single-word completion. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub id: SampleId,
    pub experiment_id: ExperimentId,
    pub provider: ProviderId,
    pub model_id: String,
    pub temperature: f64,
    pub top_k: u32,
    pub word: String,
    pub latency_ms: u64,
    pub cost: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        experiment_id: ExperimentId,
        provider: ProviderId,
        model_id: impl Into<String>,
        temperature: f64,
        top_k: u32,
        word: impl Into<String>,
        latency_ms: u64,
        cost: Decimal,
    ) -> Self {
        Self {
            id: SampleId::new(),
            experiment_id,
            provider,
            model_id: model_id.into(),
            temperature,
            top_k,
            word: word.into(),
            latency_ms,
            cost,
            timestamp: Utc::now(),
        }
    }
}
