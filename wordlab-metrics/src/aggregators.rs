use std::collections::HashMap;

use wordlab_core::{
    ConfigBreakdown, Experiment, ExperimentConfig, ExperimentResults, ModelBreakdown, Sample,
    TemperatureBreakdown, WordFrequency,
};

use crate::frequency::{counts, word_frequencies};
use crate::latency::LatencyCalculator;
use crate::statistical::DiversityAnalyzer;

/// Reduces a sample set into an [`ExperimentResults`] report.
pub struct ResultsAggregator;

impl ResultsAggregator {
    /// Pure and infallible. An empty sample set yields the zero report.
    ///
    /// Two calls over the same slice return identical reports, including
    /// ordering. `computed_at` is the experiment's completion time, or its
    /// creation time while it has not finished.
    pub fn aggregate(experiment: &Experiment, samples: &[Sample]) -> ExperimentResults {
        let computed_at = experiment.completed_at.unwrap_or(experiment.created_at);
        if samples.is_empty() {
            return ExperimentResults::empty(experiment.id, computed_at);
        }

        let (top_words, entropy) = Self::distribution(samples.iter());

        for sample in samples {
            if !experiment.has_config(sample.temperature, sample.top_k) {
                tracing::warn!(
                    experiment_id = %experiment.id,
                    model = %sample.model_id,
                    temperature = sample.temperature,
                    top_k = sample.top_k,
                    "sample config is not part of the experiment sweep"
                );
            }
        }

        ExperimentResults {
            experiment_id: experiment.id,
            total_samples: samples.len() as u64,
            unique_words: top_words.len(),
            top_words,
            entropy,
            by_model: Self::by_model(samples),
            by_temperature: Self::by_temperature(samples),
            by_config: Self::by_config(samples),
            latency: Self::latency(samples.iter()),
            computed_at,
        }
    }

    fn distribution<'a>(samples: impl Iterator<Item = &'a Sample>) -> (Vec<WordFrequency>, f64) {
        let table = word_frequencies(samples.map(|s| s.word.as_str()));
        let entropy = DiversityAnalyzer::shannon_entropy(&counts(&table));
        (table, entropy)
    }

    fn latency<'a>(samples: impl Iterator<Item = &'a Sample>) -> wordlab_core::LatencyStats {
        let measurements: Vec<f64> = samples.map(|s| s.latency_ms as f64).collect();
        LatencyCalculator::from_measurements(&measurements)
    }

    fn by_model(samples: &[Sample]) -> Vec<ModelBreakdown> {
        group_by_first_seen(samples, |s| s.model_id.clone())
            .into_iter()
            .map(|(model_id, group)| {
                let first = group[0];
                let mut configs: Vec<ExperimentConfig> = Vec::new();
                for sample in &group {
                    if !configs.iter().any(|c| c.matches(sample.temperature, sample.top_k)) {
                        configs.push(ExperimentConfig::new(sample.temperature, sample.top_k));
                    }
                }

                let (top_words, entropy) = Self::distribution(group.iter().copied());
                ModelBreakdown {
                    model_id,
                    config: ExperimentConfig::new(first.temperature, first.top_k),
                    configs,
                    total_samples: group.len() as u64,
                    unique_words: top_words.len(),
                    top_words,
                    entropy,
                    latency: Self::latency(group.iter().copied()),
                }
            })
            .collect()
    }

    fn by_temperature(samples: &[Sample]) -> Vec<TemperatureBreakdown> {
        let mut breakdown: Vec<TemperatureBreakdown> =
            group_by_first_seen(samples, |s| s.temperature.to_bits())
                .into_iter()
                .map(|(bits, group)| {
                    let (top_words, _) = Self::distribution(group.iter().copied());
                    TemperatureBreakdown {
                        temperature: f64::from_bits(bits),
                        total_samples: group.len() as u64,
                        top_words,
                    }
                })
                .collect();
        breakdown.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        breakdown
    }

    fn by_config(samples: &[Sample]) -> Vec<ConfigBreakdown> {
        group_by_first_seen(samples, |s| (s.model_id.clone(), s.temperature.to_bits(), s.top_k))
            .into_iter()
            .map(|((model_id, bits, top_k), group)| {
                let (top_words, entropy) = Self::distribution(group.iter().copied());
                ConfigBreakdown {
                    model_id,
                    config: ExperimentConfig::new(f64::from_bits(bits), top_k),
                    total_samples: group.len() as u64,
                    unique_words: top_words.len(),
                    top_words,
                    entropy,
                }
            })
            .collect()
    }
}

/// Groups samples by `key`, keeping groups in order of first appearance and
/// samples within a group in input order.
fn group_by_first_seen<K, F>(samples: &[Sample], key: F) -> Vec<(K, Vec<&Sample>)>
where
    K: std::hash::Hash + Eq + Clone,
    F: Fn(&Sample) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&Sample>)> = Vec::new();

    for sample in samples {
        let k = key(sample);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(sample),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![sample]));
            }
        }
    }
    groups
}
