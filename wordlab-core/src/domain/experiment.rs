use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::ExperimentId;
use super::pricing::estimate_experiment_cost;
use super::provider::{ModelSpec, ProviderId};
use super::sweep::ExperimentConfig;
use crate::error::{CoreError, Result};

// ===== Experiment Status =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExperimentStatus {
    pub fn can_transition_to(&self, target: &ExperimentStatus) -> bool {
        use ExperimentStatus::*;
        matches!(
            (self, target),
            (Pending, Running) | (Running, Completed) | (Running, Failed) | (Running, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExperimentStatus::Completed | ExperimentStatus::Failed | ExperimentStatus::Cancelled
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ExperimentStatus::Running)
    }
}

impl std::fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExperimentStatus::Pending => "pending",
            ExperimentStatus::Running => "running",
            ExperimentStatus::Completed => "completed",
            ExperimentStatus::Failed => "failed",
            ExperimentStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

// ===== Experiment Definition =====

/// Caller-supplied part of an experiment, validated before anything runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewExperiment {
    pub name: Option<String>,

    #[validate(length(min = 1, message = "stimulus must not be empty"))]
    pub stimulus: String,

    #[validate(length(min = 1, message = "select at least one model"))]
    pub selected_models: Vec<ModelSpec>,

    #[validate(length(min = 1, message = "at least one configuration is required"))]
    pub configs: Vec<ExperimentConfig>,

    #[validate(range(min = 1, message = "samples per config must be positive"))]
    pub samples_per_config: u32,
}

// ===== Experiment Domain Model =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: Option<String>,
    pub stimulus: String,
    pub selected_models: Vec<ModelSpec>,
    pub configs: Vec<ExperimentConfig>,
    pub samples_per_config: u32,
    pub total_calls: u64,
    pub status: ExperimentStatus,
    pub estimated_cost: Decimal,
    pub actual_cost: Option<Decimal>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Experiment {
    pub fn new(definition: NewExperiment) -> Result<Self> {
        definition.validate()?;
        if definition.stimulus.trim().is_empty() {
            return Err(CoreError::Validation("stimulus must not be blank".to_string()));
        }

        let mut models: Vec<ModelSpec> = Vec::with_capacity(definition.selected_models.len());
        for model in definition.selected_models {
            if !models.contains(&model) {
                models.push(model);
            }
        }

        let calls_per_model =
            definition.configs.len() as u64 * u64::from(definition.samples_per_config);
        let total_calls = models.len() as u64 * calls_per_model;
        let estimated_cost =
            estimate_experiment_cost(&models, &definition.stimulus, calls_per_model);

        Ok(Self {
            id: ExperimentId::new(),
            name: definition.name,
            stimulus: definition.stimulus,
            selected_models: models,
            configs: definition.configs,
            samples_per_config: definition.samples_per_config,
            total_calls,
            status: ExperimentStatus::Pending,
            estimated_cost,
            actual_cost: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        })
    }

    /// Distinct providers referenced by the selected models, in selection order.
    pub fn providers(&self) -> Vec<ProviderId> {
        let mut providers = Vec::new();
        for model in &self.selected_models {
            if !providers.contains(&model.provider) {
                providers.push(model.provider);
            }
        }
        providers
    }

    pub fn has_config(&self, temperature: f64, top_k: u32) -> bool {
        self.configs.iter().any(|c| c.matches(temperature, top_k))
    }

    // State transition methods

    fn transition(&mut self, target: ExperimentStatus) -> Result<()> {
        if !self.status.can_transition_to(&target) {
            return Err(CoreError::InvalidState(format!(
                "Cannot transition experiment {} from {} to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(ExperimentStatus::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn complete(&mut self, actual_cost: Decimal) -> Result<()> {
        self.transition(ExperimentStatus::Completed)?;
        self.finish(actual_cost);
        Ok(())
    }

    pub fn cancel(&mut self, actual_cost: Decimal) -> Result<()> {
        self.transition(ExperimentStatus::Cancelled)?;
        self.finish(actual_cost);
        Ok(())
    }

    pub fn fail(&mut self, actual_cost: Decimal, error: impl Into<String>) -> Result<()> {
        self.transition(ExperimentStatus::Failed)?;
        self.error = Some(error.into());
        self.finish(actual_cost);
        Ok(())
    }

    fn finish(&mut self, actual_cost: Decimal) {
        self.actual_cost = Some(actual_cost);
        self.completed_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
