#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use wordlab_core::{
    CommunityReporter, CommunitySummary, Credentials, Experiment, ExperimentConfig, ModelSpec,
    NewExperiment, ProviderId, Result,
};
use wordlab_providers::{
    GatewayConfig, ModelProvider, ProviderError, ProviderGateway, ProviderResult, RawCompletion,
    SampleParams,
};
use wordlab_storage::MemoryStore;
use wordlab_workflow::{ExperimentRunner, RunnerSettings};

type Script = dyn Fn(usize, &SampleParams) -> ProviderResult<RawCompletion> + Send + Sync;

/// Provider whose answer is computed from the call index and request.
pub struct FakeProvider {
    id: ProviderId,
    calls: AtomicUsize,
    script: Box<Script>,
}

impl FakeProvider {
    pub fn new(
        id: ProviderId,
        script: impl Fn(usize, &SampleParams) -> ProviderResult<RawCompletion> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            calls: AtomicUsize::new(0),
            script: Box::new(script),
        })
    }

    pub fn constant(id: ProviderId, word: &'static str) -> Arc<Self> {
        Self::new(id, move |_, _| Ok(RawCompletion::new(word).with_usage(20, 1)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for FakeProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn validate_key_format(&self, _api_key: &str) -> bool {
        true
    }

    async fn sample(&self, params: &SampleParams, _api_key: &str) -> ProviderResult<RawCompletion> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        (self.script)(index, params)
    }
}

pub fn api_error() -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: "upstream exploded".to_string(),
    }
}

pub fn gateway(providers: Vec<Arc<FakeProvider>>) -> Arc<ProviderGateway> {
    let mut gateway = ProviderGateway::new(GatewayConfig {
        requests_per_minute: 600,
        request_timeout: Duration::from_secs(30),
    });
    for provider in providers {
        gateway.register(provider);
    }
    Arc::new(gateway)
}

pub fn runner(gateway: Arc<ProviderGateway>, store: Arc<MemoryStore>) -> ExperimentRunner {
    ExperimentRunner::builder(gateway)
        .store(store)
        .settings(RunnerSettings::default())
        .build()
}

pub fn experiment(models: Vec<ModelSpec>, configs: Vec<ExperimentConfig>, samples_per_config: u32) -> Experiment {
    Experiment::new(NewExperiment {
        name: Some("test run".to_string()),
        stimulus: "Say a word".to_string(),
        selected_models: models,
        configs,
        samples_per_config,
    })
    .unwrap()
}

pub fn openai(model: &str) -> ModelSpec {
    ModelSpec::new(ProviderId::OpenAI, model)
}

pub fn credentials_for(providers: &[ProviderId]) -> Credentials {
    providers
        .iter()
        .map(|p| (*p, format!("{}-test-key", p)))
        .collect()
}

/// Reporter forwarding every summary to a channel, optionally after a delay.
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<CommunitySummary>,
    delay: Duration,
}

impl ChannelReporter {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CommunitySummary>) {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<CommunitySummary>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, delay }), rx)
    }
}

#[async_trait]
impl CommunityReporter for ChannelReporter {
    async fn submit(&self, summary: &CommunitySummary) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let _ = self.tx.send(summary.clone());
        Ok(())
    }
}
