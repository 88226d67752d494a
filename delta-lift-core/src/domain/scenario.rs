use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_finite, DomainError, DomainResult};

// ===== Experiment Groups =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Control,
    Treatment,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Control => write!(f, "control"),
            Group::Treatment => write!(f, "treatment"),
        }
    }
}

/// Where a group's variance came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VarianceSource {
    /// Supplied by the caller.
    Explicit,
    /// Derived as `mu * (1 - mu)`.
    Binomial,
}

/// Variance of a Bernoulli outcome with success rate `mean`.
pub fn binomial_variance(mean: f64) -> f64 {
    mean * (1.0 - mean)
}

// ===== Scenario Specification =====

/// Scenario parameters as they arrive from a file, flags or a preset.
///
/// Nothing is checked here; convert into [`ExperimentScenario`] to validate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSpec {
    pub n1: u64,
    pub n2: u64,
    pub mu1: f64,
    #[serde(default)]
    pub lift: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var2: Option<f64>,
}

// ===== Experiment Scenario =====

/// A validated two-group experiment: sample sizes, control mean, relative
/// lift, and optional caller-supplied variances.
///
/// Once constructed the scenario guarantees `n1 > 1`, `n2 > 1`, `mu1 != 0`,
/// finite inputs, and (for any group whose variance is derived from the
/// binomial model) a mean inside `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ScenarioSpec", into = "ScenarioSpec")]
pub struct ExperimentScenario {
    n1: u64,
    n2: u64,
    mu1: f64,
    lift: f64,
    var1: Option<f64>,
    var2: Option<f64>,
}

impl ExperimentScenario {
    /// Scenario with both variances derived from the binomial model.
    pub fn new(n1: u64, n2: u64, mu1: f64, lift: f64) -> DomainResult<Self> {
        Self::from_parts(n1, n2, mu1, lift, None, None)
    }

    /// Scenario with both variances supplied by the caller.
    pub fn with_variances(
        n1: u64,
        n2: u64,
        mu1: f64,
        lift: f64,
        var1: f64,
        var2: f64,
    ) -> DomainResult<Self> {
        Self::from_parts(n1, n2, mu1, lift, Some(var1), Some(var2))
    }

    pub fn from_parts(
        n1: u64,
        n2: u64,
        mu1: f64,
        lift: f64,
        var1: Option<f64>,
        var2: Option<f64>,
    ) -> DomainResult<Self> {
        ensure_sample_size(Group::Control, n1)?;
        ensure_sample_size(Group::Treatment, n2)?;

        let mu1 = ensure_finite("mu1", mu1)?;
        let lift = ensure_finite("lift", lift)?;
        let var1 = var1.map(|v| ensure_finite("var1", v)).transpose()?;
        let var2 = var2.map(|v| ensure_finite("var2", v)).transpose()?;

        if mu1 == 0.0 {
            return Err(DomainError::ZeroBaseline);
        }

        let mu2 = ensure_finite("mu2", mu1 * (1.0 + lift))?;

        if var1.is_none() {
            ensure_proportion(Group::Control, mu1)?;
        }
        if var2.is_none() {
            ensure_proportion(Group::Treatment, mu2)?;
        }

        Ok(Self {
            n1,
            n2,
            mu1,
            lift,
            var1,
            var2,
        })
    }

    pub fn n1(&self) -> u64 {
        self.n1
    }

    pub fn n2(&self) -> u64 {
        self.n2
    }

    pub fn sample_size(&self, group: Group) -> u64 {
        match group {
            Group::Control => self.n1,
            Group::Treatment => self.n2,
        }
    }

    pub fn control_mean(&self) -> f64 {
        self.mu1
    }

    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// `mu2 = mu1 * (1 + lift)`.
    pub fn treatment_mean(&self) -> f64 {
        self.mu1 * (1.0 + self.lift)
    }

    pub fn mean(&self, group: Group) -> f64 {
        match group {
            Group::Control => self.control_mean(),
            Group::Treatment => self.treatment_mean(),
        }
    }

    /// Resolved variance of a group: the supplied value, else `mu * (1 - mu)`.
    pub fn variance(&self, group: Group) -> f64 {
        let supplied = match group {
            Group::Control => self.var1,
            Group::Treatment => self.var2,
        };
        supplied.unwrap_or_else(|| binomial_variance(self.mean(group)))
    }

    pub fn control_variance(&self) -> f64 {
        self.variance(Group::Control)
    }

    pub fn treatment_variance(&self) -> f64 {
        self.variance(Group::Treatment)
    }

    pub fn variance_source(&self, group: Group) -> VarianceSource {
        let supplied = match group {
            Group::Control => self.var1,
            Group::Treatment => self.var2,
        };
        match supplied {
            Some(_) => VarianceSource::Explicit,
            None => VarianceSource::Binomial,
        }
    }

    /// Same sample sizes and variance policy at a different lift.
    pub fn with_lift(&self, lift: f64) -> DomainResult<Self> {
        Self::from_parts(self.n1, self.n2, self.mu1, lift, self.var1, self.var2)
    }
}

impl TryFrom<ScenarioSpec> for ExperimentScenario {
    type Error = DomainError;

    fn try_from(spec: ScenarioSpec) -> DomainResult<Self> {
        Self::from_parts(spec.n1, spec.n2, spec.mu1, spec.lift, spec.var1, spec.var2)
    }
}

impl From<ExperimentScenario> for ScenarioSpec {
    fn from(scenario: ExperimentScenario) -> Self {
        Self {
            n1: scenario.n1,
            n2: scenario.n2,
            mu1: scenario.mu1,
            lift: scenario.lift,
            var1: scenario.var1,
            var2: scenario.var2,
        }
    }
}

// ===== Scenario Template =====

/// Everything about a scenario except the lift, used to drive sweeps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioTemplate {
    pub n1: u64,
    pub n2: u64,
    pub mu1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var2: Option<f64>,
}

impl ScenarioTemplate {
    pub fn new(n1: u64, n2: u64, mu1: f64) -> Self {
        Self {
            n1,
            n2,
            mu1,
            var1: None,
            var2: None,
        }
    }

    pub fn with_variances(mut self, var1: f64, var2: f64) -> Self {
        self.var1 = Some(var1);
        self.var2 = Some(var2);
        self
    }

    /// Instantiate the template at `lift`, validating the result.
    pub fn at_lift(&self, lift: f64) -> DomainResult<ExperimentScenario> {
        ExperimentScenario::from_parts(self.n1, self.n2, self.mu1, lift, self.var1, self.var2)
    }
}

fn ensure_sample_size(group: Group, size: u64) -> DomainResult<()> {
    if size > 1 {
        Ok(())
    } else {
        Err(DomainError::InvalidSampleSize { group, size })
    }
}

fn ensure_proportion(group: Group, mean: f64) -> DomainResult<()> {
    if (0.0..=1.0).contains(&mean) {
        Ok(())
    } else {
        Err(DomainError::ProportionOutOfRange { group, mean })
    }
}
