//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wordlab_core::{AxisSpec, ExperimentId, ModelSpec, ProviderId, SweepSpec};

use crate::output::OutputFormat;

/// Sample single-word answers from language models and measure how diverse
/// they are.
#[derive(Debug, Parser)]
#[command(name = "wordlab", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Explicit configuration file, layered over the default locations
    #[arg(long, global = true, env = "WORDLAB_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an experiment and print its results
    Run(RunArgs),

    /// Preview the configurations a sweep expands to
    Expand(ExpandArgs),

    /// List known models and their prices
    Models {
        /// Only show models from this provider
        #[arg(short, long)]
        provider: Option<ProviderId>,
    },

    /// Check that an API key has the expected format
    CheckKey {
        /// Provider the key belongs to
        provider: ProviderId,
        /// The key to check
        key: String,
    },

    /// Show a persisted experiment and its results
    Show {
        /// Experiment ID
        id: ExperimentId,
    },

    /// List persisted experiments
    List {
        /// Maximum number of experiments to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Temperature: a single value (`0.7`) or a range (`0.0..1.5:4`)
    #[arg(short, long, default_value = "1.0", value_parser = parse_temperature_axis)]
    pub temperature: AxisSpec<f64>,

    /// Top-K: a single value (`40`) or a range (`10..50:3`)
    #[arg(short = 'k', long, default_value = "40", value_parser = parse_top_k_axis)]
    pub top_k: AxisSpec<u32>,
}

impl SweepArgs {
    pub fn spec(&self) -> SweepSpec {
        SweepSpec::new(self.temperature, self.top_k)
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Prompt every model answers with a single word
    #[arg(short, long)]
    pub stimulus: String,

    /// Models to sample, e.g. `gpt-4o-mini` or `anthropic/claude-3-5-haiku-20241022`
    #[arg(short, long = "model", required = true, num_args = 1..)]
    pub models: Vec<ModelSpec>,

    /// Repetitions per model and configuration
    #[arg(short = 'n', long, default_value = "10")]
    pub samples: u32,

    /// Optional experiment name
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Do not share an anonymised summary with the community endpoint
    #[arg(long)]
    pub no_share: bool,
}

#[derive(Debug, Args)]
pub struct ExpandArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Models to include in the call and cost estimate
    #[arg(short, long = "model")]
    pub models: Vec<ModelSpec>,

    /// Repetitions per model and configuration
    #[arg(short = 'n', long, default_value = "10")]
    pub samples: u32,

    /// Stimulus used for the cost estimate
    #[arg(short, long, default_value = "")]
    pub stimulus: String,
}

fn parse_temperature_axis(value: &str) -> Result<AxisSpec<f64>, String> {
    parse_axis(value)
}

fn parse_top_k_axis(value: &str) -> Result<AxisSpec<u32>, String> {
    parse_axis(value)
}

/// `VALUE` or `MIN..MAX:STEPS`.
fn parse_axis<T>(value: &str) -> Result<AxisSpec<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parse = |s: &str| s.trim().parse::<T>().map_err(|e| format!("invalid value '{}': {}", s, e));

    match value.split_once("..") {
        None => Ok(AxisSpec::single(parse(value)?)),
        Some((min, rest)) => {
            let (max, steps) = rest
                .split_once(':')
                .ok_or_else(|| format!("range '{}' needs a step count, e.g. 0.0..1.0:5", value))?;
            let steps = steps
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid step count '{}': {}", steps, e))?;
            Ok(AxisSpec::range(parse(min)?, parse(max)?, steps))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("0.7", AxisSpec::single(0.7))]
    #[case("0.0..1.5:4", AxisSpec::range(0.0, 1.5, 4))]
    #[case(" 0.2 .. 0.8 : 3", AxisSpec::range(0.2, 0.8, 3))]
    fn test_parse_temperature_axis(#[case] input: &str, #[case] expected: AxisSpec<f64>) {
        assert_eq!(parse_temperature_axis(input).unwrap(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("0.1..0.5")]
    #[case("0.1..0.5:x")]
    fn test_parse_axis_rejects_malformed(#[case] input: &str) {
        assert!(parse_temperature_axis(input).is_err());
    }

    #[test]
    fn test_parse_top_k_axis() {
        assert_eq!(parse_top_k_axis("10..50:3").unwrap(), AxisSpec::range(10, 50, 3));
        assert!(parse_top_k_axis("-1").is_err());
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "wordlab",
            "run",
            "-s",
            "Name a fruit",
            "-m",
            "gpt-4o-mini",
            "-m",
            "anthropic/claude-3-5-haiku-20241022",
            "-t",
            "0.2..1.0:3",
            "-n",
            "5",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.stimulus, "Name a fruit");
                assert_eq!(args.models.len(), 2);
                assert_eq!(args.models[1].provider, ProviderId::Anthropic);
                assert_eq!(args.samples, 5);
                assert_eq!(args.sweep.spec().expand().unwrap().len(), 3);
                assert!(!args.no_share);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_a_model() {
        assert!(Cli::try_parse_from(["wordlab", "run", "-s", "hello"]).is_err());
    }
}
