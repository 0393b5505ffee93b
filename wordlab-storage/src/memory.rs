use async_trait::async_trait;
use dashmap::DashMap;
use wordlab_core::{
    Experiment, ExperimentId, ExperimentResults, ExperimentStore, Result, ResultsStore, Sample,
    SampleStore,
};

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    experiments: DashMap<ExperimentId, Experiment>,
    samples: DashMap<ExperimentId, Vec<Sample>>,
    results: DashMap<ExperimentId, ExperimentResults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self, experiment_id: &ExperimentId) -> usize {
        self.samples
            .get(experiment_id)
            .map(|samples| samples.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn save_sample(&self, sample: &Sample) -> Result<()> {
        self.samples
            .entry(sample.experiment_id)
            .or_default()
            .push(sample.clone());
        Ok(())
    }

    async fn samples_for(&self, experiment_id: &ExperimentId) -> Result<Vec<Sample>> {
        Ok(self
            .samples
            .get(experiment_id)
            .map(|samples| samples.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ExperimentStore for MemoryStore {
    async fn save_experiment(&self, experiment: &Experiment) -> Result<()> {
        self.experiments.insert(experiment.id, experiment.clone());
        Ok(())
    }

    async fn load_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>> {
        Ok(self.experiments.get(id).map(|entry| entry.clone()))
    }

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let mut experiments: Vec<Experiment> =
            self.experiments.iter().map(|entry| entry.value().clone()).collect();
        experiments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(experiments)
    }
}

#[async_trait]
impl ResultsStore for MemoryStore {
    async fn save_results(&self, results: &ExperimentResults) -> Result<()> {
        self.results.insert(results.experiment_id, results.clone());
        Ok(())
    }

    async fn load_results(&self, id: &ExperimentId) -> Result<Option<ExperimentResults>> {
        Ok(self.results.get(id).map(|entry| entry.clone()))
    }
}
