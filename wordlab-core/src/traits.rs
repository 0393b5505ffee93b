use async_trait::async_trait;

use crate::domain::{CommunitySummary, Experiment, ExperimentId, ExperimentResults, Sample};
use crate::error::Result;

/// Append-only storage for realised samples, scoped by experiment.
#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn save_sample(&self, sample: &Sample) -> Result<()>;
    async fn samples_for(&self, experiment_id: &ExperimentId) -> Result<Vec<Sample>>;
}

#[async_trait]
pub trait ExperimentStore: Send + Sync {
    async fn save_experiment(&self, experiment: &Experiment) -> Result<()>;
    async fn load_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>>;
    async fn list_experiments(&self) -> Result<Vec<Experiment>>;
}

#[async_trait]
pub trait ResultsStore: Send + Sync {
    async fn save_results(&self, results: &ExperimentResults) -> Result<()>;
    async fn load_results(&self, id: &ExperimentId) -> Result<Option<ExperimentResults>>;
}

/// Receives anonymised summaries of completed experiments.
///
/// Callers never await this on the main path; a failed submission is only
/// ever logged.
#[async_trait]
pub trait CommunityReporter: Send + Sync {
    async fn submit(&self, summary: &CommunitySummary) -> Result<()>;
}
