//! Lifecycle management for running experiments.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use wordlab_core::{
    CommunityReporter, Credentials, Experiment, ExperimentId, ExperimentStatus, ExperimentStore,
    ResultsStore, RunProgress, SampleStore,
};
use wordlab_providers::ProviderGateway;
use wordlab_storage::MemoryStore;

use crate::error::RunnerError;
use crate::execution::{ActiveRun, RunTask};

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Pause between successive calls of one experiment
    pub pacing_delay: Duration,
    /// Output token cap sent with every request
    pub max_tokens: u32,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(100),
            max_tokens: 10,
        }
    }
}

pub(crate) struct RunHandle {
    pub(crate) cancel: CancellationToken,
    pub(crate) progress: watch::Receiver<RunProgress>,
}

pub(crate) struct RunnerShared {
    pub(crate) gateway: Arc<ProviderGateway>,
    pub(crate) samples: Arc<dyn SampleStore>,
    pub(crate) experiments: Arc<dyn ExperimentStore>,
    pub(crate) results: Arc<dyn ResultsStore>,
    pub(crate) reporter: Option<Arc<dyn CommunityReporter>>,
    pub(crate) settings: RunnerSettings,
    pub(crate) running: DashMap<ExperimentId, RunHandle>,
    /// In-flight community submissions.
    pub(crate) reports: TaskTracker,
}

/// Starts, observes and aborts experiments.
///
/// Each started experiment runs on its own tokio task. The runner is cheap to
/// clone; clones share the same set of active runs.
#[derive(Clone)]
pub struct ExperimentRunner {
    shared: Arc<RunnerShared>,
}

impl ExperimentRunner {
    pub fn builder(gateway: Arc<ProviderGateway>) -> RunnerBuilder {
        RunnerBuilder::new(gateway)
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.shared.settings
    }

    /// Validate and launch `experiment`, returning once the run is registered.
    ///
    /// The caller's value is never modified. The runner works on its own copy,
    /// which it moves to `running` and persists from the spawned task.
    pub fn start(&self, experiment: &Experiment, credentials: &Credentials) -> Result<(), RunnerError> {
        if experiment.status != ExperimentStatus::Pending {
            return Err(RunnerError::InvalidState {
                id: experiment.id,
                status: experiment.status,
            });
        }

        if self.shared.running.contains_key(&experiment.id) {
            return Err(RunnerError::AlreadyRunning(experiment.id));
        }

        let providers = experiment.providers();
        if let Some(unknown) = providers
            .iter()
            .copied()
            .find(|id| !self.shared.gateway.is_registered(*id))
        {
            return Err(RunnerError::UnknownProvider(unknown));
        }

        let missing = credentials.missing_for(providers.iter().copied());
        if !missing.is_empty() {
            return Err(RunnerError::MissingCredentials(missing));
        }

        let mut run = experiment.clone();
        run.start()?;

        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(RunProgress::new(run.id, run.total_calls));

        match self.shared.running.entry(run.id) {
            Entry::Occupied(_) => return Err(RunnerError::AlreadyRunning(run.id)),
            Entry::Vacant(slot) => {
                slot.insert(RunHandle {
                    cancel: cancel.clone(),
                    progress: progress_rx,
                });
            }
        }

        tracing::info!(
            experiment_id = %run.id,
            models = run.selected_models.len(),
            configs = run.configs.len(),
            total_calls = run.total_calls,
            "Starting experiment"
        );

        let task = RunTask {
            active: ActiveRun::new(Arc::clone(&self.shared), run.id),
            shared: Arc::clone(&self.shared),
            experiment: run,
            credentials: credentials.clone(),
            cancel,
            progress: progress_tx,
        };
        tokio::spawn(task.run());

        Ok(())
    }

    /// Cancel a run and wait until it has been finalised.
    pub async fn abort(&self, id: &ExperimentId) -> Result<(), RunnerError> {
        let mut progress = {
            let handle = self
                .shared
                .running
                .get(id)
                .ok_or(RunnerError::NotRunning(*id))?;
            handle.cancel.cancel();
            handle.progress.clone()
        };

        tracing::info!(experiment_id = %id, "Abort requested");

        // The sender is dropped only after finalisation.
        while progress.changed().await.is_ok() {}
        Ok(())
    }

    /// Wait for a run to finish on its own. Returns immediately if `id` is not
    /// running.
    pub async fn wait(&self, id: &ExperimentId) {
        let progress = self.subscribe(id);
        if let Some(mut progress) = progress {
            while progress.changed().await.is_ok() {}
        }
    }

    pub fn get_progress(&self, id: &ExperimentId) -> Option<RunProgress> {
        self.shared
            .running
            .get(id)
            .map(|handle| handle.progress.borrow().clone())
    }

    pub fn subscribe(&self, id: &ExperimentId) -> Option<watch::Receiver<RunProgress>> {
        self.shared
            .running
            .get(id)
            .map(|handle| handle.progress.clone())
    }

    pub fn is_running(&self, id: &ExperimentId) -> bool {
        self.shared.running.contains_key(id)
    }

    pub fn list_running(&self) -> Vec<ExperimentId> {
        let mut ids: Vec<ExperimentId> = self.shared.running.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    /// Number of community submissions still in flight.
    pub fn pending_reports(&self) -> usize {
        self.shared.reports.len()
    }

    /// Wait up to `timeout` for in-flight community submissions.
    ///
    /// Returns `false` if some were still pending when the timeout expired.
    /// Submissions that outlive the timeout keep running; the runner stays
    /// usable afterwards.
    pub async fn drain_reports(&self, timeout: Duration) -> bool {
        let reports = &self.shared.reports;
        reports.close();
        let drained = tokio::time::timeout(timeout, reports.wait()).await.is_ok();
        reports.reopen();

        if !drained {
            tracing::warn!(
                pending = reports.len(),
                "Community submissions still in flight after {:?}",
                timeout
            );
        }
        drained
    }
}

impl std::fmt::Debug for ExperimentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentRunner")
            .field("settings", &self.shared.settings)
            .field("running", &self.list_running())
            .finish()
    }
}

/// Wires the runner's collaborators. Stores left unset fall back to
/// in-memory storage.
pub struct RunnerBuilder {
    gateway: Arc<ProviderGateway>,
    samples: Option<Arc<dyn SampleStore>>,
    experiments: Option<Arc<dyn ExperimentStore>>,
    results: Option<Arc<dyn ResultsStore>>,
    reporter: Option<Arc<dyn CommunityReporter>>,
    settings: RunnerSettings,
}

impl RunnerBuilder {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self {
            gateway,
            samples: None,
            experiments: None,
            results: None,
            reporter: None,
            settings: RunnerSettings::default(),
        }
    }

    /// Use one backend for samples, experiments and results.
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: SampleStore + ExperimentStore + ResultsStore + 'static,
    {
        self.sample_store(Arc::clone(&store) as Arc<dyn SampleStore>)
            .experiment_store(Arc::clone(&store) as Arc<dyn ExperimentStore>)
            .results_store(store as Arc<dyn ResultsStore>)
    }

    pub fn sample_store(mut self, store: Arc<dyn SampleStore>) -> Self {
        self.samples = Some(store);
        self
    }

    pub fn experiment_store(mut self, store: Arc<dyn ExperimentStore>) -> Self {
        self.experiments = Some(store);
        self
    }

    pub fn results_store(mut self, store: Arc<dyn ResultsStore>) -> Self {
        self.results = Some(store);
        self
    }

    pub fn community_reporter(mut self, reporter: Arc<dyn CommunityReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn settings(mut self, settings: RunnerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn pacing_delay(mut self, delay: Duration) -> Self {
        self.settings.pacing_delay = delay;
        self
    }

    pub fn build(self) -> ExperimentRunner {
        let fallback = Arc::new(MemoryStore::new());
        let shared = RunnerShared {
            gateway: self.gateway,
            samples: self
                .samples
                .unwrap_or_else(|| Arc::clone(&fallback) as Arc<dyn SampleStore>),
            experiments: self
                .experiments
                .unwrap_or_else(|| Arc::clone(&fallback) as Arc<dyn ExperimentStore>),
            results: self
                .results
                .unwrap_or_else(|| fallback as Arc<dyn ResultsStore>),
            reporter: self.reporter,
            settings: self.settings,
            running: DashMap::new(),
            reports: TaskTracker::new(),
        };

        ExperimentRunner {
            shared: Arc::new(shared),
        }
    }
}
