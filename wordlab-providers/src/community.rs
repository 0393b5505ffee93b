use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;
use wordlab_core::{CommunityReporter, CommunitySummary, CoreError, Result};

/// Posts anonymised summaries as JSON to a community collection endpoint.
#[derive(Debug, Clone)]
pub struct HttpCommunityReporter {
    client: Client,
    endpoint: Url,
}

impl HttpCommunityReporter {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CoreError::Validation(format!("invalid community endpoint: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CoreError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CommunityReporter for HttpCommunityReporter {
    async fn submit(&self, summary: &CommunitySummary) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(summary)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("community submission failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Internal(format!(
                "community endpoint returned {}",
                status
            )));
        }

        tracing::debug!(fingerprint = %summary.stimulus_fingerprint, "Submitted community summary");
        Ok(())
    }
}
