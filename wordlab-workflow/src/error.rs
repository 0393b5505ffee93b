use thiserror::Error;
use wordlab_core::{CoreError, ExperimentId, ExperimentStatus, ProviderId};
use wordlab_providers::ProviderError;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Experiment {0} is already running")]
    AlreadyRunning(ExperimentId),

    #[error("Experiment {0} is not running")]
    NotRunning(ExperimentId),

    #[error("Missing API credentials for: {}", join_providers(.0))]
    MissingCredentials(Vec<ProviderId>),

    #[error("No provider registered for '{0}'")]
    UnknownProvider(ProviderId),

    #[error("Experiment {id} is {status}; only pending experiments can start")]
    InvalidState {
        id: ExperimentId,
        status: ExperimentStatus,
    },

    /// Raised inside a run only; ends the experiment as failed.
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ProviderError> for RunnerError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownProvider(id) => RunnerError::UnknownProvider(id),
            other => RunnerError::Provider(other),
        }
    }
}

fn join_providers(providers: &[ProviderId]) -> String {
    providers
        .iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
