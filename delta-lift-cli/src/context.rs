//! CLI execution context

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Settings;
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// Layered settings
    pub settings: Settings,

    /// Output format
    pub output_format: OutputFormat,

    /// Output writer
    pub output: OutputWriter,

    /// Verbose mode
    pub verbose: bool,

    /// Significance level override from `--alpha`
    pub alpha_override: Option<f64>,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(cli.config.as_deref())?;

        let output_format = cli.output.unwrap_or(settings.output);
        let output = OutputWriter::new(output_format, cli.no_color);

        Ok(Self {
            settings,
            output_format,
            output,
            verbose: cli.verbose,
            alpha_override: cli.alpha,
        })
    }

    /// Effective significance level: `--alpha`, then the scenario file, then settings
    pub fn alpha(&self, from_file: Option<f64>) -> f64 {
        self.alpha_override
            .or(from_file)
            .unwrap_or(self.settings.alpha)
    }
}
