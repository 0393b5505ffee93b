//! JSON document store on the local filesystem.
//!
//! Layout below the data directory:
//!
//! ```text
//! experiments/{id}.json   latest experiment record
//! samples/{id}.jsonl      one sample per line, append-only
//! results/{id}.json       aggregated report
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use wordlab_core::{
    CoreError, Experiment, ExperimentId, ExperimentResults, ExperimentStore, Result, ResultsStore,
    Sample, SampleStore,
};

const EXPERIMENTS_DIR: &str = "experiments";
const SAMPLES_DIR: &str = "samples";
const RESULTS_DIR: &str = "results";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating the directory tree if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [EXPERIMENTS_DIR, SAMPLES_DIR, RESULTS_DIR] {
            fs::create_dir_all(root.join(dir)).await.map_err(|e| {
                CoreError::Storage(format!("cannot create {}: {}", root.join(dir).display(), e))
            })?;
        }
        tracing::debug!(root = %root.display(), "Opened JSON file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn experiment_path(&self, id: &ExperimentId) -> PathBuf {
        self.root.join(EXPERIMENTS_DIR).join(format!("{}.json", id))
    }

    fn samples_path(&self, id: &ExperimentId) -> PathBuf {
        self.root.join(SAMPLES_DIR).join(format!("{}.jsonl", id))
    }

    fn results_path(&self, id: &ExperimentId) -> PathBuf {
        self.root.join(RESULTS_DIR).join(format!("{}.json", id))
    }

    /// Write via a sibling temp file and rename, so readers never see a
    /// half-written document.
    async fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SampleStore for JsonFileStore {
    async fn save_sample(&self, sample: &Sample) -> Result<()> {
        let mut line = serde_json::to_vec(sample)?;
        line.push(b'\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.samples_path(&sample.experiment_id))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn samples_for(&self, experiment_id: &ExperimentId) -> Result<Vec<Sample>> {
        let contents = match fs::read_to_string(self.samples_path(experiment_id)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CoreError::from))
            .collect()
    }
}

#[async_trait]
impl ExperimentStore for JsonFileStore {
    async fn save_experiment(&self, experiment: &Experiment) -> Result<()> {
        Self::write_document(&self.experiment_path(&experiment.id), experiment).await
    }

    async fn load_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>> {
        Self::read_document(&self.experiment_path(id)).await
    }

    /// All readable experiments, newest first. Unreadable files are skipped.
    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let mut entries = fs::read_dir(self.root.join(EXPERIMENTS_DIR)).await?;
        let mut experiments = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_document::<Experiment>(&path).await {
                Ok(Some(experiment)) => experiments.push(experiment),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable experiment file");
                }
            }
        }

        experiments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(experiments)
    }
}

#[async_trait]
impl ResultsStore for JsonFileStore {
    async fn save_results(&self, results: &ExperimentResults) -> Result<()> {
        Self::write_document(&self.results_path(&results.experiment_id), results).await
    }

    async fn load_results(&self, id: &ExperimentId) -> Result<Option<ExperimentResults>> {
        Self::read_document(&self.results_path(id)).await
    }
}
