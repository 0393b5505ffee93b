use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod report;

use cli::{Cli, Command};
use context::Context;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_directive = if cli.verbose { "wordlab=debug" } else { "wordlab=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into());

    let json = cli.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text = (!cli.log_json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new(&cli)?;

    match cli.command {
        Command::Run(args) => commands::run::execute(&ctx, args).await,
        Command::Expand(args) => commands::expand::execute(&ctx, args),
        Command::Models { provider } => commands::models::execute(&ctx, provider),
        Command::CheckKey { provider, key } => commands::check_key::execute(&ctx, provider, key),
        Command::Show { id } => commands::show::execute(&ctx, id).await,
        Command::List { limit } => commands::list::execute(&ctx, limit).await,
    }
}
