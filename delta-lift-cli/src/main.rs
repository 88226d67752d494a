use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod chart;
mod cli;
mod commands;
mod config;
mod context;
mod output;

use cli::{Cli, Commands};
use context::Context;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new(&cli)?;

    init_tracing(&ctx.settings.log_level, ctx.verbose);
    tracing::debug!(
        alpha = ctx.settings.alpha,
        output = %ctx.output_format,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Compare(args) => commands::compare::execute(&ctx, args),
        Commands::Sweep(args) => commands::sweep::execute(&ctx, args),
        Commands::Presets => commands::presets::execute(&ctx),
    }
}

/// Logs go to stderr so JSON and YAML output stay machine-readable.
fn init_tracing(log_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
