//! Output formatting for CLI

use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use wordlab_core::{ExperimentId, ExperimentStatus};

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Table,
    /// Pretty-printed JSON on stdout
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
    interactive: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self {
            format,
            interactive: console::Term::stderr().is_term(),
        }
    }

    pub fn is_table(&self) -> bool {
        self.format == OutputFormat::Table
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if self.is_table() {
            println!("{} {}", "✓".green(), message);
        } else {
            eprintln!("{}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.is_table() {
            eprintln!("{} {}", "⚠".yellow(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_table() {
            println!("{} {}", "ℹ".blue(), message);
        } else {
            eprintln!("{}", message);
        }
    }

    /// Progress bar for a run, hidden when stderr is not a terminal.
    pub fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ ");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

/// A table with the CLI's house style and cyan headers.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

pub fn print_field(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

pub fn print_section(title: &str) {
    println!("\n{}", title.bold().underline());
}

pub fn format_id_short(id: &ExperimentId) -> String {
    let s = id.to_string();
    format!("{}...", &s[..8])
}

pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Dollar amount with six decimal places; model calls are cheap.
pub fn format_cost(cost: Decimal) -> String {
    format!("${}", cost.round_dp(6))
}

pub fn format_eta(ms: f64) -> String {
    if !ms.is_finite() {
        return "--".to_string();
    }
    let secs = (ms / 1000.0).round() as u64;
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

pub fn status_badge(status: ExperimentStatus) -> String {
    let text = status.to_string();
    match status {
        ExperimentStatus::Running => text.blue().to_string(),
        ExperimentStatus::Completed => text.green().to_string(),
        ExperimentStatus::Failed => text.red().to_string(),
        ExperimentStatus::Pending => text.yellow().to_string(),
        ExperimentStatus::Cancelled => text.dimmed().to_string(),
    }
}
