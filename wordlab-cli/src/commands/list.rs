//! `wordlab list`

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use wordlab_core::ExperimentStore;

use crate::context::Context;
use crate::output::{format_cost, format_id_short, format_timestamp, status_badge, table};

pub async fn execute(ctx: &Context, limit: usize) -> Result<()> {
    let store = ctx.store().await?;
    let experiments: Vec<_> = store
        .list_experiments()
        .await?
        .into_iter()
        .take(limit)
        .collect();

    if !ctx.output.is_table() {
        return ctx.output.json(&experiments);
    }

    if experiments.is_empty() {
        println!("{}", "No experiments found.".dimmed());
        return Ok(());
    }

    let mut rows = table(&["ID", "Name", "Status", "Stimulus", "Models", "Calls", "Cost", "Created"]);
    for exp in &experiments {
        rows.add_row(vec![
            Cell::new(format_id_short(&exp.id)),
            Cell::new(exp.name.as_deref().unwrap_or("-")),
            Cell::new(status_badge(exp.status)),
            Cell::new(&exp.stimulus),
            Cell::new(exp.selected_models.len()),
            Cell::new(exp.total_calls),
            Cell::new(format_cost(exp.actual_cost.unwrap_or(exp.estimated_cost))),
            Cell::new(format_timestamp(&exp.created_at)),
        ]);
    }
    println!("{rows}");
    println!(
        "\n{} {} experiment(s)",
        "Total:".bold(),
        experiments.len().to_string().green()
    );
    Ok(())
}
