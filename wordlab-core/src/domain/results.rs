use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::experiment::Experiment;
use super::ids::ExperimentId;
use super::sweep::ExperimentConfig;

/// Number of words forwarded in a community summary.
pub const COMMUNITY_TOP_WORDS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelBreakdown {
    pub model_id: String,
    /// Config of the first sample seen for this model.
    pub config: ExperimentConfig,
    /// Every distinct config the model was sampled under, first-seen order.
    pub configs: Vec<ExperimentConfig>,
    pub total_samples: u64,
    pub unique_words: usize,
    pub top_words: Vec<WordFrequency>,
    pub entropy: f64,
    pub latency: LatencyStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureBreakdown {
    pub temperature: f64,
    pub total_samples: u64,
    pub top_words: Vec<WordFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigBreakdown {
    pub model_id: String,
    pub config: ExperimentConfig,
    pub total_samples: u64,
    pub unique_words: usize,
    pub top_words: Vec<WordFrequency>,
    pub entropy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentResults {
    pub experiment_id: ExperimentId,
    pub total_samples: u64,
    pub unique_words: usize,
    pub top_words: Vec<WordFrequency>,
    /// Shannon entropy in bits.
    pub entropy: f64,
    pub by_model: Vec<ModelBreakdown>,
    pub by_temperature: Vec<TemperatureBreakdown>,
    pub by_config: Vec<ConfigBreakdown>,
    pub latency: LatencyStats,
    pub computed_at: DateTime<Utc>,
}

impl ExperimentResults {
    pub fn empty(experiment_id: ExperimentId, computed_at: DateTime<Utc>) -> Self {
        Self {
            experiment_id,
            total_samples: 0,
            unique_words: 0,
            top_words: Vec::new(),
            entropy: 0.0,
            by_model: Vec::new(),
            by_temperature: Vec::new(),
            by_config: Vec::new(),
            latency: LatencyStats::default(),
            computed_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }

    pub fn model(&self, model_id: &str) -> Option<&ModelBreakdown> {
        self.by_model.iter().find(|m| m.model_id == model_id)
    }
}

/// Anonymised digest shared with the community feed. Carries no identifiers
/// and no credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunitySummary {
    pub stimulus: String,
    pub stimulus_fingerprint: String,
    pub models: Vec<String>,
    pub configs: Vec<ExperimentConfig>,
    pub samples_per_config: u32,
    pub total_samples: u64,
    pub unique_words: usize,
    pub entropy: f64,
    pub top_words: Vec<WordFrequency>,
}

impl CommunitySummary {
    pub fn new(experiment: &Experiment, results: &ExperimentResults) -> Self {
        Self {
            stimulus: experiment.stimulus.clone(),
            stimulus_fingerprint: fingerprint(&experiment.stimulus),
            models: experiment
                .selected_models
                .iter()
                .map(|m| m.model.clone())
                .collect(),
            configs: experiment.configs.clone(),
            samples_per_config: experiment.samples_per_config,
            total_samples: results.total_samples,
            unique_words: results.unique_words,
            entropy: results.entropy,
            top_words: results
                .top_words
                .iter()
                .take(COMMUNITY_TOP_WORDS)
                .cloned()
                .collect(),
        }
    }
}

/// SHA-256 of the normalised stimulus, hex encoded.
pub fn fingerprint(stimulus: &str) -> String {
    let normalised = stimulus.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalised.as_bytes());
    hex::encode(hasher.finalize())
}
