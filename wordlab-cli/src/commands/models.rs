//! `wordlab models`

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;
use wordlab_core::{ModelCatalog, ProviderId};

use crate::context::Context;
use crate::output::{format_cost, table};

#[derive(Debug, Serialize)]
struct ModelDisplay {
    id: &'static str,
    provider: ProviderId,
    name: &'static str,
    input_cost_per_1k: rust_decimal::Decimal,
    output_cost_per_1k: rust_decimal::Decimal,
}

pub fn execute(ctx: &Context, provider: Option<ProviderId>) -> Result<()> {
    let models: Vec<ModelDisplay> = ModelCatalog::all()
        .iter()
        .filter(|info| provider.map_or(true, |p| info.provider == p))
        .map(|info| {
            let pricing = info.pricing();
            ModelDisplay {
                id: info.id,
                provider: info.provider,
                name: info.display_name,
                input_cost_per_1k: pricing.input_cost_per_1k,
                output_cost_per_1k: pricing.output_cost_per_1k,
            }
        })
        .collect();

    if !ctx.output.is_table() {
        return ctx.output.json(&models);
    }

    let mut rows = table(&["Model", "Provider", "Name", "Input $/1K", "Output $/1K"]);
    for model in &models {
        rows.add_row(vec![
            Cell::new(model.id),
            Cell::new(model.provider),
            Cell::new(model.name),
            Cell::new(format_cost(model.input_cost_per_1k)),
            Cell::new(format_cost(model.output_cost_per_1k)),
        ]);
    }
    println!("{rows}");
    Ok(())
}
