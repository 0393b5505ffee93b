mod common;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use pretty_assertions::assert_eq;
use wordlab_core::*;
use wordlab_storage::MemoryStore;
use wordlab_workflow::ExperimentRunner;

use common::*;

mock! {
    pub Samples {}

    #[async_trait]
    impl SampleStore for Samples {
        async fn save_sample(&self, sample: &Sample) -> Result<()>;
        async fn samples_for(&self, experiment_id: &ExperimentId) -> Result<Vec<Sample>>;
    }
}

#[tokio::test(start_paused = true)]
async fn test_sample_persistence_failure_does_not_change_outcome() {
    let mut samples = MockSamples::new();
    samples
        .expect_save_sample()
        .times(4)
        .returning(|_| Err(CoreError::Storage("disk full".to_string())));

    let store = Arc::new(MemoryStore::new());
    let runner = ExperimentRunner::builder(gateway(vec![FakeProvider::constant(
        ProviderId::OpenAI,
        "steady",
    )]))
    .sample_store(Arc::new(samples))
    .experiment_store(store.clone())
    .results_store(store.clone())
    .build();
    let exp = experiment(vec![openai("gpt-4o")], vec![ExperimentConfig::new(1.0, 40)], 4);

    runner
        .start(&exp, &credentials_for(&[ProviderId::OpenAI]))
        .unwrap();
    let progress = runner.subscribe(&exp.id).unwrap();
    runner.wait(&exp.id).await;

    let snapshot = progress.borrow().clone();
    assert_eq!(snapshot.completed_calls, 4);
    assert_eq!(snapshot.persistence_failures, 4);
    assert_eq!(snapshot.failed_calls, 0);

    let finished = store.load_experiment(&exp.id).await.unwrap().unwrap();
    assert_eq!(finished.status, ExperimentStatus::Completed);

    let results = store.load_results(&exp.id).await.unwrap().unwrap();
    assert_eq!(results.total_samples, 4);
}

struct BrokenStore;

#[async_trait]
impl ExperimentStore for BrokenStore {
    async fn save_experiment(&self, _experiment: &Experiment) -> Result<()> {
        Err(CoreError::Storage("read-only filesystem".to_string()))
    }

    async fn load_experiment(&self, _id: &ExperimentId) -> Result<Option<Experiment>> {
        Ok(None)
    }

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn test_finalisation_errors_are_swallowed() {
    let store = Arc::new(MemoryStore::new());
    let runner = ExperimentRunner::builder(gateway(vec![FakeProvider::constant(
        ProviderId::OpenAI,
        "fine",
    )]))
    .sample_store(store.clone())
    .experiment_store(Arc::new(BrokenStore))
    .results_store(store.clone())
    .build();
    let exp = experiment(vec![openai("gpt-4o")], vec![ExperimentConfig::new(1.0, 40)], 2);

    runner
        .start(&exp, &credentials_for(&[ProviderId::OpenAI]))
        .unwrap();
    runner.wait(&exp.id).await;

    assert!(!runner.is_running(&exp.id));
    assert_eq!(store.samples_for(&exp.id).await.unwrap().len(), 2);
    assert_eq!(
        store.load_results(&exp.id).await.unwrap().unwrap().total_samples,
        2
    );
}
