use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Test Kinds =====

/// The two hypotheses compared for every scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// `mu2 - mu1` with the unadjusted variance.
    Absolute,
    /// `mu2 / mu1 - 1` with the Delta Method variance.
    Relative,
}

impl TestKind {
    pub const ALL: [TestKind; 2] = [TestKind::Absolute, TestKind::Relative];

    pub fn label(&self) -> &'static str {
        match self {
            TestKind::Absolute => "Absolute difference",
            TestKind::Relative => "Relative difference (Delta Method)",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Absolute => write!(f, "absolute"),
            TestKind::Relative => write!(f, "relative"),
        }
    }
}

// ===== Test Result =====

/// Outcome of a single-sample t-test on a point estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub metric: f64,
    pub std_error: f64,
    pub test_statistic: f64,
    pub p_value: f64,
    pub lcl: f64,
    pub ucl: f64,
}

impl TestResult {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Full width of the confidence interval.
    pub fn width(&self) -> f64 {
        self.ucl - self.lcl
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lcl <= value && value <= self.ucl
    }
}

// ===== Comparison Result =====

/// Absolute and relative tests for one scenario, sharing one `dof`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub dof: f64,
    pub treatment_mean: f64,
    pub absolute: TestResult,
    pub relative: TestResult,
}

impl ComparisonResult {
    pub fn get(&self, kind: TestKind) -> &TestResult {
        match kind {
            TestKind::Absolute => &self.absolute,
            TestKind::Relative => &self.relative,
        }
    }
}
