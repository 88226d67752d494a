//! CLI configuration management

use anyhow::{Context as _, Result};
use config::{Config as ConfigLoader, Environment, File};
use delta_lift_core::{LiftSpec, ScenarioTemplate, DEFAULT_ALPHA};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::output::OutputFormat;

/// Environment variable prefix, e.g. `DELTA_LIFT_ALPHA=0.01`
pub const ENV_PREFIX: &str = "DELTA_LIFT";

/// Settings shared by every command
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Settings {
    /// Significance level for both tests
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub alpha: f64,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,

    /// Default output format
    pub output: OutputFormat,

    /// Chart width in pixels
    #[validate(range(min = 200, max = 4000))]
    pub chart_width: u32,

    /// Chart height in pixels
    #[validate(range(min = 150, max = 4000))]
    pub chart_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            log_level: "info".to_string(),
            output: OutputFormat::Table,
            chart_width: 800,
            chart_height: 400,
        }
    }
}

impl Settings {
    /// Load settings: defaults, `config/default`, the user config file, an
    /// explicit `--config` file, then `DELTA_LIFT_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = ConfigLoader::builder()
            .set_default("alpha", defaults.alpha)?
            .set_default("log_level", defaults.log_level.clone())?
            .set_default("output", defaults.output.to_string())?
            .set_default("chart_width", i64::from(defaults.chart_width))?
            .set_default("chart_height", i64::from(defaults.chart_height))?
            .add_source(File::with_name("config/default").required(false));

        if let Some(path) = Self::user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        settings.validate().context("Invalid configuration")?;
        Ok(settings)
    }

    /// Get the user configuration file path
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "delta-lift", "delta-lift")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// A scenario file: a template plus optional lifts and significance level
///
/// ```toml
/// alpha = 0.05
///
/// [scenario]
/// n1 = 46000
/// n2 = 46700
/// mu1 = 0.33
/// var1 = 0.1089
/// var2 = 0.1156
///
/// [lifts]
/// start = 0.0
/// stop = 0.03
/// step = 0.001
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioFile {
    pub scenario: ScenarioTemplate,

    #[serde(default)]
    pub lifts: Option<LiftSpec>,

    #[serde(default)]
    pub alpha: Option<f64>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse scenario file {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.alpha, 0.05);
        assert_eq!(settings.output, OutputFormat::Table);
    }

    #[test]
    fn test_settings_reject_bad_alpha() {
        let settings = Settings {
            alpha: 1.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "alpha = 0.01\noutput = \"json\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.alpha, 0.01);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.chart_width, 800);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "alpha = 2.0\n").unwrap();

        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_parse_scenario_file_with_grid() {
        let file = ScenarioFile::parse(
            r#"
            alpha = 0.1

            [scenario]
            n1 = 46000
            n2 = 46700
            mu1 = 0.33
            var1 = 0.1089
            var2 = 0.1156

            [lifts]
            start = 0.0
            stop = 0.002
            step = 0.001
            "#,
        )
        .unwrap();

        assert_eq!(file.alpha, Some(0.1));
        assert_eq!(file.scenario.var2, Some(0.1156));
        assert_eq!(file.lifts.unwrap().resolve().unwrap(), vec![0.0, 0.001, 0.002]);
    }

    #[test]
    fn test_parse_scenario_file_with_values() {
        let file = ScenarioFile::parse(
            r#"
            [scenario]
            n1 = 700000
            n2 = 710000
            mu1 = 0.002

            [lifts]
            values = [0.05, 0.07]
            "#,
        )
        .unwrap();

        assert_eq!(file.scenario.var1, None);
        assert_eq!(
            file.lifts,
            Some(LiftSpec::Values {
                values: vec![0.05, 0.07]
            })
        );
    }

    #[test]
    fn test_parse_scenario_file_without_lifts() {
        let file = ScenarioFile::parse("[scenario]\nn1 = 10\nn2 = 10\nmu1 = 0.5\n").unwrap();
        assert!(file.lifts.is_none());
        assert!(file.alpha.is_none());
    }
}
