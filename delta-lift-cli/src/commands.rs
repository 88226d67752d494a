pub mod compare;
pub mod presets;
pub mod sweep;

use anyhow::{bail, Result};
use clap::Args;
use delta_lift_core::{find_preset, presets as core_presets, Preset, ScenarioTemplate};

/// Scenario selection shared by `compare` and `sweep`
#[derive(Debug, Clone, Default, Args)]
pub struct ScenarioArgs {
    /// Built-in scenario (see `delta-lift presets`)
    #[arg(short, long, conflicts_with_all = ["n1", "n2", "mu1"])]
    pub preset: Option<String>,

    /// Control group sample size
    #[arg(long)]
    pub n1: Option<u64>,

    /// Treatment group sample size
    #[arg(long)]
    pub n2: Option<u64>,

    /// Control group mean (baseline rate)
    #[arg(long, allow_negative_numbers = true)]
    pub mu1: Option<f64>,

    /// Control group variance (default: mu1 * (1 - mu1))
    #[arg(long, allow_negative_numbers = true)]
    pub var1: Option<f64>,

    /// Treatment group variance (default: mu2 * (1 - mu2))
    #[arg(long, allow_negative_numbers = true)]
    pub var2: Option<f64>,
}

/// A template together with the preset it came from, if any
#[derive(Debug, Clone, Copy)]
pub struct ResolvedScenario {
    pub template: ScenarioTemplate,
    pub preset: Option<&'static Preset>,
}

impl ScenarioArgs {
    /// Replace the template's variances with `--var1` / `--var2` where given.
    pub fn override_variances(&self, mut template: ScenarioTemplate) -> ScenarioTemplate {
        template.var1 = self.var1.or(template.var1);
        template.var2 = self.var2.or(template.var2);
        template
    }

    /// Build the template from a preset or from explicit flags.
    ///
    /// Returns `None` when no scenario flags were given at all. `--var1` and
    /// `--var2` override the preset's variances.
    pub fn resolve(&self) -> Result<Option<ResolvedScenario>> {
        if let Some(name) = &self.preset {
            let Some(preset) = find_preset(name) else {
                let known: Vec<&str> = core_presets().iter().map(|p| p.name).collect();
                bail!("Unknown preset '{}' (available: {})", name, known.join(", "));
            };
            return Ok(Some(ResolvedScenario {
                template: self.override_variances(preset.template),
                preset: Some(preset),
            }));
        }

        match (self.n1, self.n2, self.mu1) {
            (Some(n1), Some(n2), Some(mu1)) => Ok(Some(ResolvedScenario {
                template: ScenarioTemplate {
                    n1,
                    n2,
                    mu1,
                    var1: self.var1,
                    var2: self.var2,
                },
                preset: None,
            })),
            (None, None, None) => Ok(None),
            _ => bail!("--n1, --n2 and --mu1 must be given together"),
        }
    }
}
