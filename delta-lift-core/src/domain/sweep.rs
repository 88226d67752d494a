use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::result::{ComparisonResult, TestKind};
use super::scenario::ScenarioTemplate;
use crate::error::{CoreError, DomainError, DomainResult, Result};

/// Conventional two-sided significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Upper bound on the number of lifts a grid may expand to.
pub const MAX_GRID_POINTS: usize = 10_000;

// ===== Lift Grids =====

/// Inclusive arithmetic grid `start, start + step, ..., stop`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
#[validate(schema(function = "validate_grid_bounds"))]
pub struct LiftGrid {
    pub start: f64,
    pub stop: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub step: f64,
}

impl LiftGrid {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn expand(&self) -> Result<Vec<f64>> {
        self.validate()?;

        // Representation error must not drop `stop` from the grid.
        let last = ((self.stop - self.start) / self.step + 1e-9).floor();
        if last >= MAX_GRID_POINTS as f64 {
            return Err(CoreError::Validation(format!(
                "lift grid {}..={} step {} exceeds {} points",
                self.start, self.stop, self.step, MAX_GRID_POINTS
            )));
        }

        Ok((0..=last as usize)
            .map(|i| tidy(self.start + i as f64 * self.step))
            .collect())
    }
}

fn validate_grid_bounds(grid: &LiftGrid) -> std::result::Result<(), ValidationError> {
    if !(grid.start.is_finite() && grid.stop.is_finite() && grid.step.is_finite()) {
        let mut err = ValidationError::new("non_finite");
        err.message = Some(Cow::Borrowed("grid bounds and step must be finite"));
        return Err(err);
    }
    if grid.start > grid.stop {
        let mut err = ValidationError::new("reversed_bounds");
        err.message = Some(Cow::Borrowed("grid start must not exceed stop"));
        return Err(err);
    }
    Ok(())
}

fn tidy(value: f64) -> f64 {
    (value * 1e12).round() / 1e12
}

/// Lifts as written in a scenario file: an explicit list or a grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LiftSpec {
    Values { values: Vec<f64> },
    Grid(LiftGrid),
}

impl LiftSpec {
    pub fn resolve(&self) -> Result<Vec<f64>> {
        match self {
            LiftSpec::Values { values } => Ok(values.clone()),
            LiftSpec::Grid(grid) => grid.expand(),
        }
    }
}

// ===== Sweep Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SweepConfig {
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub alpha: f64,

    #[validate(length(min = 1))]
    pub lifts: Vec<f64>,
}

impl SweepConfig {
    pub fn new(alpha: f64, lifts: Vec<f64>) -> Self {
        Self { alpha, lifts }
    }
}

// ===== Sweep Report =====

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepPoint {
    pub index: usize,
    pub lift: f64,
    pub comparison: ComparisonResult,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepFailure {
    pub index: usize,
    pub lift: f64,
    pub error: DomainError,
}

/// One p-value curve: lifts on the x-axis, p-values on the y-axis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PValueSeries {
    pub kind: TestKind,
    pub label: String,
    pub lifts: Vec<f64>,
    pub p_values: Vec<f64>,
}

impl PValueSeries {
    pub fn len(&self) -> usize {
        self.lifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lifts.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lifts.iter().copied().zip(self.p_values.iter().copied())
    }
}

/// Results of sweeping a template across lifts.
///
/// Successful points and failures are kept apart, each tagged with the
/// position of its lift in the input sequence.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepReport {
    pub alpha: f64,
    pub template: ScenarioTemplate,
    pub points: Vec<SweepPoint>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn new(alpha: f64, template: ScenarioTemplate) -> Self {
        Self {
            alpha,
            template,
            points: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, index: usize, lift: f64, outcome: DomainResult<ComparisonResult>) {
        match outcome {
            Ok(comparison) => self.points.push(SweepPoint {
                index,
                lift,
                comparison,
            }),
            Err(error) => self.failures.push(SweepFailure { index, lift, error }),
        }
    }

    pub fn evaluated(&self) -> usize {
        self.points.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Absolute and relative p-value series over the successful points.
    pub fn series(&self) -> Vec<PValueSeries> {
        TestKind::ALL
            .iter()
            .map(|&kind| PValueSeries {
                kind,
                label: kind.label().to_string(),
                lifts: self.points.iter().map(|p| p.lift).collect(),
                p_values: self
                    .points
                    .iter()
                    .map(|p| p.comparison.get(kind).p_value)
                    .collect(),
            })
            .collect()
    }

    /// Smallest positive lift in the sweep whose p-value drops below `alpha`.
    pub fn minimum_detectable_lift(&self, kind: TestKind) -> Option<f64> {
        self.points
            .iter()
            .filter(|p| p.lift > 0.0 && p.comparison.get(kind).is_significant(self.alpha))
            .map(|p| p.lift)
            .fold(None, |best: Option<f64>, lift| match best {
                Some(b) if b <= lift => Some(b),
                _ => Some(lift),
            })
    }
}
