//! Layered lab configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use wordlab_core::{Credentials, ProviderId};
use wordlab_providers::GatewayConfig;
use wordlab_workflow::RunnerSettings;

pub const CONFIG_FILE_NAME: &str = "wordlab.toml";
pub const ENV_PREFIX: &str = "WORDLAB";

/// Environment variables consulted for each provider's API key, in order.
pub const CREDENTIAL_VARS: &[(ProviderId, &[&str])] = &[
    (ProviderId::OpenAI, &["OPENAI_API_KEY"]),
    (ProviderId::Anthropic, &["ANTHROPIC_API_KEY"]),
    (ProviderId::Google, &["GOOGLE_API_KEY", "GEMINI_API_KEY"]),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    /// Where experiments, samples and results are written
    pub data_dir: PathBuf,
    pub requests_per_minute: u32,
    pub request_timeout_secs: u64,
    pub pacing_delay_ms: u64,
    pub max_tokens: u32,
    /// Endpoint receiving anonymised summaries; sharing is off when unset
    pub community_endpoint: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub google_base_url: String,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            requests_per_minute: 60,
            request_timeout_secs: 30,
            pacing_delay_ms: 100,
            max_tokens: 10,
            community_endpoint: None,
            openai_base_url: wordlab_providers::providers::openai::DEFAULT_BASE_URL.to_string(),
            anthropic_base_url: wordlab_providers::providers::anthropic::DEFAULT_BASE_URL.to_string(),
            google_base_url: wordlab_providers::providers::google::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl LabConfig {
    /// Load from, in increasing precedence: built-in defaults, the user config
    /// directory, `./wordlab.toml`, an explicit file, and `WORDLAB_*`
    /// environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(dirs) = project_dirs() {
            builder = builder
                .add_source(File::from(dirs.config_dir().join(CONFIG_FILE_NAME)).required(false));
        }
        builder = builder.add_source(File::from(PathBuf::from(CONFIG_FILE_NAME)).required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<LabConfig>()
            .context("Invalid configuration")?;

        tracing::debug!(data_dir = %config.data_dir.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            requests_per_minute: self.requests_per_minute,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            pacing_delay: Duration::from_millis(self.pacing_delay_ms),
            max_tokens: self.max_tokens,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "wordlab", "wordlab")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("wordlab-data"))
}

/// Collect provider keys from the environment. Blank values are ignored.
pub fn credentials_from_env() -> Credentials {
    credentials_from(|name| std::env::var(name).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Credentials {
    let mut credentials = Credentials::new();
    for (provider, vars) in CREDENTIAL_VARS {
        if let Some(key) = vars
            .iter()
            .filter_map(|var| lookup(*var))
            .find(|key| !key.trim().is_empty())
        {
            credentials.insert(*provider, key);
        }
    }
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = LabConfig::default();
        assert_eq!(config.requests_per_minute, 60);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.pacing_delay_ms, 100);
        assert_eq!(config.max_tokens, 10);
        assert!(config.community_endpoint.is_none());
        assert_eq!(config.gateway_config().request_timeout, Duration::from_secs(30));
        assert_eq!(config.runner_settings().pacing_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
requests_per_minute = 120
max_tokens = 4
community_endpoint = "https://community.example.org/api/submit"
openai_base_url = "http://localhost:8080"
"#,
        )
        .unwrap();

        let config = LabConfig::load(Some(&path)).unwrap();
        assert_eq!(config.requests_per_minute, 120);
        assert_eq!(config.max_tokens, 4);
        assert_eq!(
            config.community_endpoint.as_deref(),
            Some("https://community.example.org/api/submit")
        );
        assert_eq!(config.openai_base_url, "http://localhost:8080");
        assert_eq!(config.gateway_config().requests_per_minute, 120);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LabConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_credentials_lookup_order() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-openai"),
            ("ANTHROPIC_API_KEY", "   "),
            ("GEMINI_API_KEY", "AIza-gemini"),
        ]
        .into_iter()
        .collect();

        let credentials = credentials_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(credentials.get(ProviderId::OpenAI), Some("sk-openai"));
        assert_eq!(credentials.get(ProviderId::Anthropic), None);
        assert_eq!(credentials.get(ProviderId::Google), Some("AIza-gemini"));
    }
}
