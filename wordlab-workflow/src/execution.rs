//! The per-experiment task: sampling loop and finalisation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wordlab_core::{
    CommunitySummary, Credentials, Experiment, ExperimentId, ExperimentStatus, RunProgress, Sample,
};
use wordlab_metrics::ResultsAggregator;
use wordlab_providers::SampleParams;

use crate::error::RunnerError;
use crate::runner::RunnerShared;

/// How the sampling loop ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RunOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

/// Deregisters the run from the active map when dropped, including on unwind.
pub(crate) struct ActiveRun {
    shared: Arc<RunnerShared>,
    id: ExperimentId,
}

impl ActiveRun {
    pub(crate) fn new(shared: Arc<RunnerShared>, id: ExperimentId) -> Self {
        Self { shared, id }
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.shared.running.remove(&self.id);
    }
}

// Field order matters: `active` is dropped before `progress`, so observers
// waiting on the channel only wake once the run is deregistered.
pub(crate) struct RunTask {
    pub(crate) active: ActiveRun,
    pub(crate) shared: Arc<RunnerShared>,
    pub(crate) experiment: Experiment,
    pub(crate) credentials: Credentials,
    pub(crate) cancel: CancellationToken,
    pub(crate) progress: watch::Sender<RunProgress>,
}

impl RunTask {
    pub(crate) async fn run(mut self) {
        let id = self.experiment.id;

        if let Err(e) = self.shared.experiments.save_experiment(&self.experiment).await {
            tracing::warn!(experiment_id = %id, error = %e, "Failed to persist running experiment");
        }

        let mut samples = Vec::with_capacity(self.experiment.total_calls as usize);
        let outcome = match AssertUnwindSafe(self.sample_loop(&mut samples))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => RunOutcome::Failed(e.to_string()),
            Err(panic) => RunOutcome::Failed(format!("run panicked: {}", panic_message(&*panic))),
        };

        self.finalize(outcome, &samples).await;
    }

    async fn sample_loop(&self, samples: &mut Vec<Sample>) -> Result<RunOutcome, RunnerError> {
        let experiment = &self.experiment;
        let settings = &self.shared.settings;
        let started = Instant::now();
        let mut issued: u64 = 0;

        for spec in &experiment.selected_models {
            let api_key = self
                .credentials
                .get(spec.provider)
                .ok_or_else(|| RunnerError::MissingCredentials(vec![spec.provider]))?;

            for config in &experiment.configs {
                self.progress
                    .send_modify(|progress| progress.set_position(&spec.model, *config));

                for _ in 0..experiment.samples_per_config {
                    if issued > 0 && !settings.pacing_delay.is_zero() {
                        tokio::select! {
                            _ = self.cancel.cancelled() => return Ok(RunOutcome::Cancelled),
                            _ = tokio::time::sleep(settings.pacing_delay) => {}
                        }
                    }
                    if self.cancel.is_cancelled() {
                        return Ok(RunOutcome::Cancelled);
                    }
                    issued += 1;

                    let params = SampleParams::new(
                        spec.model.as_str(),
                        experiment.stimulus.as_str(),
                        *config,
                        settings.max_tokens,
                    );

                    let sampled = match self.shared.gateway.sample(spec.provider, &params, api_key).await {
                        Ok(sampled) => sampled,
                        Err(e) if e.is_per_sample() => {
                            tracing::warn!(
                                experiment_id = %experiment.id,
                                model = %spec.model,
                                config = %config,
                                error = %e,
                                "Sample failed, skipping"
                            );
                            self.progress.send_modify(RunProgress::record_failure);
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };

                    let sample = Sample::new(
                        experiment.id,
                        spec.provider,
                        spec.model.as_str(),
                        config.temperature,
                        config.top_k,
                        sampled.word,
                        sampled.latency_ms,
                        sampled.cost,
                    );

                    let persisted = match self.shared.samples.save_sample(&sample).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(
                                experiment_id = %experiment.id,
                                sample_id = %sample.id,
                                error = %e,
                                "Failed to persist sample"
                            );
                            false
                        }
                    };

                    let elapsed = started.elapsed();
                    self.progress.send_modify(|progress| {
                        progress.record_sample(&sample.word, sample.cost, elapsed);
                        if !persisted {
                            progress.record_persistence_failure();
                        }
                    });
                    samples.push(sample);
                }
            }
        }

        Ok(RunOutcome::Completed)
    }

    /// Close out the run. Nothing here is propagated; failures are logged.
    async fn finalize(&mut self, outcome: RunOutcome, samples: &[Sample]) {
        let id = self.experiment.id;
        let actual_cost: Decimal = samples.iter().map(|s| s.cost).sum();

        let transition = match &outcome {
            RunOutcome::Completed => self.experiment.complete(actual_cost),
            RunOutcome::Cancelled => self.experiment.cancel(actual_cost),
            RunOutcome::Failed(message) => self.experiment.fail(actual_cost, message.as_str()),
        };
        if let Err(e) = transition {
            tracing::error!(experiment_id = %id, error = %e, "Invalid terminal transition");
        }

        let results = ResultsAggregator::aggregate(&self.experiment, samples);

        if let Err(e) = self.shared.experiments.save_experiment(&self.experiment).await {
            tracing::warn!(experiment_id = %id, error = %e, "Failed to persist experiment");
        }
        if let Err(e) = self.shared.results.save_results(&results).await {
            tracing::warn!(experiment_id = %id, error = %e, "Failed to persist results");
        }

        let progress = self.progress.borrow().clone();
        match &outcome {
            RunOutcome::Failed(message) => tracing::error!(
                experiment_id = %id,
                completed = progress.completed_calls,
                error = %message,
                "Experiment failed"
            ),
            _ => tracing::info!(
                experiment_id = %id,
                status = %self.experiment.status,
                completed = progress.completed_calls,
                failed = progress.failed_calls,
                unique_words = results.unique_words,
                entropy = results.entropy,
                cost = %actual_cost,
                "Experiment finished"
            ),
        }

        if self.experiment.status == ExperimentStatus::Completed {
            if let Some(reporter) = self.shared.reporter.clone() {
                let summary = CommunitySummary::new(&self.experiment, &results);
                self.shared.reports.spawn(async move {
                    match reporter.submit(&summary).await {
                        Ok(()) => tracing::debug!("Community summary submitted"),
                        Err(e) => tracing::warn!(error = %e, "Community submission failed"),
                    }
                });
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
