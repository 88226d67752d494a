//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::compare::CompareArgs;
use crate::commands::sweep::SweepArgs;
use crate::output::OutputFormat;

/// Compare absolute and Delta Method relative lift tests for A/B experiments
#[derive(Debug, Parser)]
#[command(name = "delta-lift", version, about, long_about = None)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Significance level, overriding configuration and scenario files
    #[arg(short, long, global = true)]
    pub alpha: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run both tests for a single scenario
    Compare(CompareArgs),

    /// Run both tests across a range of lifts
    Sweep(SweepArgs),

    /// List built-in scenarios
    Presets,
}
