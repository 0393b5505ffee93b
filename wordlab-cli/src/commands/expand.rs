//! `wordlab expand`

use anyhow::{Context as _, Result};
use comfy_table::Cell;
use serde::Serialize;
use wordlab_core::{estimate_experiment_cost, ExperimentConfig};

use crate::cli::ExpandArgs;
use crate::context::Context;
use crate::output::{format_cost, table};

#[derive(Debug, Serialize)]
struct ExpansionDisplay {
    configs: Vec<ExperimentConfig>,
    calls_per_model: u64,
    total_calls: u64,
    estimated_cost: Option<rust_decimal::Decimal>,
}

pub fn execute(ctx: &Context, args: ExpandArgs) -> Result<()> {
    let configs = args.sweep.spec().expand().context("Invalid sweep")?;
    let calls_per_model = configs.len() as u64 * u64::from(args.samples);
    let total_calls = calls_per_model * args.models.len() as u64;
    let estimated_cost = (!args.models.is_empty())
        .then(|| estimate_experiment_cost(&args.models, &args.stimulus, calls_per_model));

    let display = ExpansionDisplay {
        configs,
        calls_per_model,
        total_calls,
        estimated_cost,
    };

    if !ctx.output.is_table() {
        return ctx.output.json(&display);
    }

    let mut configs = table(&["#", "Temperature", "Top-K"]);
    for (index, config) in display.configs.iter().enumerate() {
        configs.add_row(vec![
            Cell::new(index + 1),
            Cell::new(format!("{:.3}", config.temperature)),
            Cell::new(config.top_k),
        ]);
    }
    println!("{configs}");

    ctx.output.info(&format!(
        "{} configuration(s) × {} sample(s) = {} call(s) per model",
        display.configs.len(),
        args.samples,
        display.calls_per_model
    ));
    if let Some(cost) = display.estimated_cost {
        ctx.output.info(&format!(
            "{} model(s): {} call(s), estimated cost {}",
            args.models.len(),
            display.total_calls,
            format_cost(cost)
        ));
    }
    Ok(())
}
