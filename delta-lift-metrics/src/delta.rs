//! Delta Method variance for relative lifts and the two-sample comparator.
//!
//! For a ratio of independent sample means the first-order Taylor expansion
//! gives
//!
//! ```text
//! Var(Ȳ/X̄) ≈ (μy²/μx²) · (Var(Ȳ)/μy² − 2·Cov(X̄,Ȳ)/(μx·μy) + Var(X̄)/μx²)
//! ```
//!
//! With the control mean as `X`, the treatment mean as `Y` and independent
//! groups the covariance vanishes, leaving
//! `var2/(mu1² · n2) + var1 · mu2²/(mu1⁴ · n1)`.

use delta_lift_core::{
    ensure_alpha, ComparisonResult, DomainError, DomainResult, ExperimentScenario, DEFAULT_ALPHA,
};

use crate::statistical::StatisticalAnalyzer;

/// Variance of `mu2 - mu1` for independent groups.
pub fn unadjusted_variance(var1: f64, n1: u64, var2: f64, n2: u64) -> f64 {
    var1 / n1 as f64 + var2 / n2 as f64
}

/// Delta Method variance of `mu2 / mu1 - 1`.
pub fn delta_method_variance(
    mu1: f64,
    mu2: f64,
    var1: f64,
    n1: u64,
    var2: f64,
    n2: u64,
) -> DomainResult<f64> {
    if mu1 == 0.0 {
        return Err(DomainError::ZeroBaseline);
    }
    Ok(var2 / (mu1.powi(2) * n2 as f64) + var1 * mu2.powi(2) / (mu1.powi(4) * n1 as f64))
}

/// The absolute-difference variance rescaled by `1 / mu1²`.
///
/// Treats the control mean as a constant, so it ignores the control group's
/// contribution to the ratio's uncertainty.
pub fn naive_ratio_variance(unadjusted_var: f64, mu1: f64) -> DomainResult<f64> {
    if mu1 == 0.0 {
        return Err(DomainError::ZeroBaseline);
    }
    Ok(unadjusted_var / mu1.powi(2))
}

/// Runs the absolute and relative t-tests for one scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleComparator {
    alpha: f64,
}

impl Default for TwoSampleComparator {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl TwoSampleComparator {
    pub fn new(alpha: f64) -> DomainResult<Self> {
        Ok(Self {
            alpha: ensure_alpha(alpha)?,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn compare(&self, scenario: &ExperimentScenario) -> DomainResult<ComparisonResult> {
        let (n1, n2) = (scenario.n1(), scenario.n2());
        let mu1 = scenario.control_mean();
        let mu2 = scenario.treatment_mean();
        let var1 = scenario.control_variance();
        let var2 = scenario.treatment_variance();

        let dof = StatisticalAnalyzer::welch_satterthwaite_df(var1, n1, var2, n2)?;
        let unadjusted_var = unadjusted_variance(var1, n1, var2, n2);
        let adjusted_var = delta_method_variance(mu1, mu2, var1, n1, var2, n2)?;

        tracing::debug!(
            n1,
            n2,
            mu1,
            mu2,
            dof,
            unadjusted_var,
            adjusted_var,
            "Comparing scenario at lift {}",
            scenario.lift()
        );

        let absolute = StatisticalAnalyzer::t_test(mu2 - mu1, unadjusted_var, self.alpha, dof)?;
        let relative =
            StatisticalAnalyzer::t_test(mu2 / mu1 - 1.0, adjusted_var, self.alpha, dof)?;

        Ok(ComparisonResult {
            dof,
            treatment_mean: mu2,
            absolute,
            relative,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_delta_variance_matches_general_ratio_formula() {
        let (mu1, mu2) = (0.4, 0.5);
        let (var1, n1, var2, n2) = (0.24, 200, 0.25, 300);

        let var_x = var1 / n1 as f64;
        let var_y = var2 / n2 as f64;
        let general =
            (mu2 * mu2 / (mu1 * mu1)) * (var_y / (mu2 * mu2) + var_x / (mu1 * mu1));

        let delta = delta_method_variance(mu1, mu2, var1, n1, var2, n2).unwrap();
        assert_relative_eq!(delta, general, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_baseline_rejected() {
        assert_eq!(
            delta_method_variance(0.0, 0.1, 1.0, 10, 1.0, 10),
            Err(DomainError::ZeroBaseline)
        );
        assert_eq!(naive_ratio_variance(1.0, 0.0), Err(DomainError::ZeroBaseline));
    }

    #[test]
    fn test_comparator_rejects_bad_alpha() {
        assert!(TwoSampleComparator::new(0.0).is_err());
        assert_eq!(TwoSampleComparator::default().alpha(), 0.05);
    }

    #[test]
    fn test_comparator_fails_on_zero_variances() {
        let scenario = ExperimentScenario::with_variances(10, 10, 1.0, 0.1, 0.0, 0.0).unwrap();
        assert!(matches!(
            TwoSampleComparator::default().compare(&scenario),
            Err(DomainError::InvalidDegreesOfFreedom { .. })
        ));
    }
}
