//! CLI execution context

use std::sync::Arc;

use anyhow::{Context as _, Result};
use wordlab_core::{CommunityReporter, Credentials};
use wordlab_providers::{
    AnthropicProvider, GoogleProvider, HttpCommunityReporter, OpenAIProvider, ProviderGateway,
};
use wordlab_storage::JsonFileStore;

use crate::cli::Cli;
use crate::config::{credentials_from_env, LabConfig};
use crate::output::OutputWriter;

/// Execution context for CLI commands
pub struct Context {
    pub config: LabConfig,
    pub output: OutputWriter,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = LabConfig::load(cli.config.as_deref())?;
        let output = OutputWriter::new(cli.output, cli.no_color);
        Ok(Self { config, output })
    }

    pub async fn store(&self) -> Result<Arc<JsonFileStore>> {
        let store = JsonFileStore::open(&self.config.data_dir)
            .await
            .with_context(|| format!("Failed to open data directory {:?}", self.config.data_dir))?;
        Ok(Arc::new(store))
    }

    /// Gateway with all three vendors on the configured base URLs.
    pub fn gateway(&self) -> Result<ProviderGateway> {
        let gateway = ProviderGateway::new(self.config.gateway_config())
            .with_provider(Arc::new(
                OpenAIProvider::with_base_url(&self.config.openai_base_url)
                    .context("Invalid OpenAI base URL")?,
            ))
            .with_provider(Arc::new(
                AnthropicProvider::with_base_url(&self.config.anthropic_base_url)
                    .context("Invalid Anthropic base URL")?,
            ))
            .with_provider(Arc::new(
                GoogleProvider::with_base_url(&self.config.google_base_url)
                    .context("Invalid Google base URL")?,
            ));
        Ok(gateway)
    }

    pub fn credentials(&self) -> Credentials {
        credentials_from_env()
    }

    pub fn community_reporter(&self) -> Result<Option<Arc<dyn CommunityReporter>>> {
        match &self.config.community_endpoint {
            Some(endpoint) => {
                let reporter = HttpCommunityReporter::new(endpoint)
                    .context("Invalid community endpoint")?;
                Ok(Some(Arc::new(reporter)))
            }
            None => Ok(None),
        }
    }
}
