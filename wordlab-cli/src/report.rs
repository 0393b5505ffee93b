//! Rendering of experiments and their results.

use colored::Colorize;
use comfy_table::Cell;
use serde::Serialize;
use wordlab_core::{Experiment, ExperimentResults};
use wordlab_metrics::{counts, DiversityAnalyzer, DiversityStats};

use crate::output::{
    format_cost, format_timestamp, print_field, print_section, status_badge, table, OutputWriter,
};

/// Words shown in the overall frequency table.
const TOP_WORDS_SHOWN: usize = 15;
/// Words listed per model.
const MODEL_WORDS_SHOWN: usize = 5;

#[derive(Debug, Serialize)]
pub struct ExperimentReport<'a> {
    pub experiment: &'a Experiment,
    pub results: Option<&'a ExperimentResults>,
    pub diversity: Option<DiversityStats>,
}

impl<'a> ExperimentReport<'a> {
    pub fn new(experiment: &'a Experiment, results: Option<&'a ExperimentResults>) -> Self {
        let diversity = results.map(|r| DiversityAnalyzer::analyze(&counts(&r.top_words)));
        Self {
            experiment,
            results,
            diversity,
        }
    }

    pub fn write(&self, output: &OutputWriter) -> anyhow::Result<()> {
        if !output.is_table() {
            return output.json(self);
        }

        self.print_experiment();
        match self.results {
            Some(results) if !results.is_empty() => self.print_results(results),
            _ => println!("\n{}", "No samples were collected.".dimmed()),
        }
        Ok(())
    }

    fn print_experiment(&self) {
        let exp = self.experiment;
        print_section("Experiment");
        print_field("ID", &exp.id.to_string());
        if let Some(name) = &exp.name {
            print_field("Name", name);
        }
        print_field("Stimulus", &exp.stimulus);
        print_field("Status", &status_badge(exp.status));
        print_field(
            "Models",
            &exp.selected_models
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        print_field(
            "Configs",
            &exp.configs
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        );
        print_field("Calls", &exp.total_calls.to_string());
        print_field("Estimated cost", &format_cost(exp.estimated_cost));
        if let Some(cost) = exp.actual_cost {
            print_field("Actual cost", &format_cost(cost));
        }
        print_field("Created", &format_timestamp(&exp.created_at));
        if let Some(seconds) = exp.duration_seconds() {
            print_field("Duration", &format!("{}s", seconds));
        }
        if let Some(error) = &exp.error {
            print_field("Error", &error.red().to_string());
        }
    }

    fn print_results(&self, results: &ExperimentResults) {
        print_section("Diversity");
        print_field("Samples", &results.total_samples.to_string());
        print_field("Unique words", &results.unique_words.to_string());
        print_field("Entropy", &format!("{:.3} bits", results.entropy));
        if let Some(stats) = &self.diversity {
            print_field("Normalised entropy", &format!("{:.3}", stats.normalized_entropy));
            print_field("Dominance", &format!("{:.1}%", stats.dominance * 100.0));
        }
        print_field(
            "Latency",
            &format!(
                "p50 {:.0} ms, p95 {:.0} ms",
                results.latency.p50_ms, results.latency.p95_ms
            ),
        );

        print_section("Top words");
        let mut words = table(&["#", "Word", "Count", "Share"]);
        for (rank, frequency) in results.top_words.iter().take(TOP_WORDS_SHOWN).enumerate() {
            words.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&frequency.word),
                Cell::new(frequency.count),
                Cell::new(format!("{:.1}%", frequency.percentage)),
            ]);
        }
        println!("{words}");

        print_section("By model");
        let mut models = table(&["Model", "Samples", "Unique", "Entropy", "p50 ms", "Top words"]);
        for breakdown in &results.by_model {
            let top = breakdown
                .top_words
                .iter()
                .take(MODEL_WORDS_SHOWN)
                .map(|w| format!("{} ({})", w.word, w.count))
                .collect::<Vec<_>>()
                .join(", ");
            models.add_row(vec![
                Cell::new(&breakdown.model_id),
                Cell::new(breakdown.total_samples),
                Cell::new(breakdown.unique_words),
                Cell::new(format!("{:.3}", breakdown.entropy)),
                Cell::new(format!("{:.0}", breakdown.latency.p50_ms)),
                Cell::new(top),
            ]);
        }
        println!("{models}");

        if results.by_temperature.len() > 1 {
            print_section("By temperature");
            let mut temperatures = table(&["Temperature", "Samples", "Top word"]);
            for breakdown in &results.by_temperature {
                let top = breakdown
                    .top_words
                    .first()
                    .map(|w| format!("{} ({:.1}%)", w.word, w.percentage))
                    .unwrap_or_default();
                temperatures.add_row(vec![
                    Cell::new(format!("{:.2}", breakdown.temperature)),
                    Cell::new(breakdown.total_samples),
                    Cell::new(top),
                ]);
            }
            println!("{temperatures}");
        }
    }
}
