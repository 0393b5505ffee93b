//! `wordlab show`

use anyhow::{Context as _, Result};
use wordlab_core::{ExperimentId, ExperimentStore, ResultsStore};

use crate::context::Context;
use crate::report::ExperimentReport;

pub async fn execute(ctx: &Context, id: ExperimentId) -> Result<()> {
    let store = ctx.store().await?;
    let experiment = store
        .load_experiment(&id)
        .await?
        .with_context(|| format!("Experiment {} not found", id))?;
    let results = store.load_results(&id).await?;

    ExperimentReport::new(&experiment, results.as_ref()).write(&ctx.output)
}
