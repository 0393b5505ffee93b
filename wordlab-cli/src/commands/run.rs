//! `wordlab run`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use wordlab_core::{Experiment, ExperimentId, ExperimentStore, NewExperiment, ResultsStore};
use wordlab_workflow::ExperimentRunner;

use crate::cli::RunArgs;
use crate::context::Context;
use crate::output::{format_cost, format_eta, OutputWriter};
use crate::report::ExperimentReport;

/// Upper bound on waiting for community submissions before exiting.
const REPORT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn execute(ctx: &Context, args: RunArgs) -> Result<()> {
    let configs = args.sweep.spec().expand().context("Invalid sweep")?;
    let experiment = Experiment::new(NewExperiment {
        name: args.name,
        stimulus: args.stimulus,
        selected_models: args.models,
        configs,
        samples_per_config: args.samples,
    })
    .context("Invalid experiment")?;

    let store = ctx.store().await?;
    let gateway = Arc::new(ctx.gateway()?);

    let mut builder = ExperimentRunner::builder(gateway)
        .store(Arc::clone(&store))
        .settings(ctx.config.runner_settings());
    if !args.no_share {
        if let Some(reporter) = ctx.community_reporter()? {
            builder = builder.community_reporter(reporter);
        }
    }
    let runner = builder.build();

    ctx.output.info(&format!(
        "Running {} calls across {} model(s), estimated cost {}",
        experiment.total_calls,
        experiment.selected_models.len(),
        format_cost(experiment.estimated_cost)
    ));

    runner.start(&experiment, &ctx.credentials())?;
    let id = experiment.id;

    let interrupted = observe(&runner, &id, experiment.total_calls, &ctx.output).await;

    if !runner.drain_reports(REPORT_DRAIN_TIMEOUT).await {
        ctx.output.warning("Community submission did not finish in time");
    }

    let finished = store
        .load_experiment(&id)
        .await?
        .unwrap_or(experiment);
    let results = store.load_results(&id).await?;

    if interrupted {
        ctx.output.warning("Experiment cancelled; partial results follow");
    }
    ExperimentReport::new(&finished, results.as_ref()).write(&ctx.output)?;

    if ctx.output.is_table() {
        ctx.output.success(&format!("Saved as {}", id));
    }
    Ok(())
}

/// Follow a run's progress until it finalises, aborting it on Ctrl-C.
///
/// Returns whether the run was interrupted. A run that already finished
/// returns straight away; its outcome is read back from the store.
async fn observe(
    runner: &ExperimentRunner,
    id: &ExperimentId,
    total_calls: u64,
    output: &OutputWriter,
) -> bool {
    let Some(mut progress) = runner.subscribe(id) else {
        tracing::debug!(experiment_id = %id, "Run finished before progress was observed");
        return false;
    };

    let bar = output.progress_bar(total_calls);
    let mut interrupted = false;
    loop {
        tokio::select! {
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = progress.borrow_and_update().clone();
                bar.set_position(snapshot.completed_calls);
                bar.set_message(format!(
                    "{} | last: {} | {} | eta {}",
                    snapshot.current_model.as_deref().unwrap_or("-"),
                    snapshot.recent_words.front().map(String::as_str).unwrap_or("-"),
                    format_cost(snapshot.running_cost),
                    format_eta(snapshot.estimated_time_remaining_ms),
                ));
            }
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                bar.set_message("cancelling...");
                if let Err(e) = runner.abort(id).await {
                    tracing::debug!(error = %e, "Abort after completion");
                }
            }
        }
    }
    bar.finish_and_clear();
    interrupted
}
