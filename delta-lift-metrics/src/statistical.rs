use delta_lift_core::{ensure_alpha, ensure_finite, DomainError, DomainResult, Group, TestResult};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Degrees of freedom above which Student's t is evaluated through its
/// expansion around the standard normal.
pub const LARGE_DOF: f64 = 1.0e4;

pub struct StatisticalAnalyzer;

impl StatisticalAnalyzer {
    /// Single-sample t-test of a point estimate against zero.
    ///
    /// `test_stat = metric / sqrt(variance)`, the two-sided p-value comes from
    /// Student's t with (possibly fractional) `dof`, and the interval is
    /// `metric ± t_{1-alpha/2, dof} * sqrt(variance)`.
    ///
    /// A zero variance collapses the interval onto `metric`; the p-value is
    /// then 1 for a zero metric and 0 otherwise.
    pub fn t_test(metric: f64, variance: f64, alpha: f64, dof: f64) -> DomainResult<TestResult> {
        let metric = ensure_finite("metric", metric)?;
        if variance < 0.0 {
            return Err(DomainError::NegativeVariance { variance });
        }
        let variance = ensure_finite("variance", variance)?;
        let alpha = ensure_alpha(alpha)?;
        let t_dist = TDistribution::new(dof)?;

        let std_error = variance.sqrt();
        let (test_statistic, p_value) = if std_error == 0.0 {
            if metric == 0.0 {
                (0.0, 1.0)
            } else {
                (metric.signum() * f64::INFINITY, 0.0)
            }
        } else {
            let t_stat = metric / std_error;
            (t_stat, t_dist.two_sided_p_value(t_stat))
        };

        let width = t_dist.quantile(1.0 - alpha / 2.0) * std_error;

        Ok(TestResult {
            metric,
            std_error,
            test_statistic,
            p_value,
            lcl: metric - width,
            ucl: metric + width,
        })
    }

    /// Two-sided critical value `t_{1-alpha/2, dof}`.
    pub fn critical_value(alpha: f64, dof: f64) -> DomainResult<f64> {
        let alpha = ensure_alpha(alpha)?;
        Ok(TDistribution::new(dof)?.quantile(1.0 - alpha / 2.0))
    }

    /// Welch–Satterthwaite effective degrees of freedom.
    ///
    /// dof = (var2/n2 + var1/n1)^2 / ((var2/n2)^2/(n2-1) + (var1/n1)^2/(n1-1))
    pub fn welch_satterthwaite_df(var1: f64, n1: u64, var2: f64, n2: u64) -> DomainResult<f64> {
        if n1 <= 1 {
            return Err(DomainError::InvalidSampleSize {
                group: Group::Control,
                size: n1,
            });
        }
        if n2 <= 1 {
            return Err(DomainError::InvalidSampleSize {
                group: Group::Treatment,
                size: n2,
            });
        }

        let n1 = n1 as f64;
        let n2 = n2 as f64;
        let s1 = var1 / n1;
        let s2 = var2 / n2;

        let numerator = (s2 + s1).powi(2);
        let denominator = s2.powi(2) / (n2 - 1.0) + s1.powi(2) / (n1 - 1.0);
        let dof = numerator / denominator;

        // Both variances zero gives 0/0.
        if dof.is_finite() && dof > 0.0 {
            Ok(dof)
        } else {
            Err(DomainError::InvalidDegreesOfFreedom { dof })
        }
    }
}

/// Student's t with `dof` degrees of freedom.
///
/// statrs' `StudentsT::inverse_cdf` loses accuracy and stops converging in
/// the millions of dof. Above [`LARGE_DOF`] both directions use expansions
/// around N(0, 1):
///
/// ```text
/// quantile: t = z + (z³ + z)/(4ν) + (5z⁵ + 16z³ + 3z)/(96ν²)     (Cornish–Fisher)
/// cdf:      z = t·(1 − 1/(4ν)) / sqrt(1 + t²/(2ν))
/// ```
enum TDistribution {
    Exact(StudentsT),
    Asymptotic { dof: f64, normal: Normal },
}

impl TDistribution {
    fn new(dof: f64) -> DomainResult<Self> {
        if !(dof.is_finite() && dof > 0.0) {
            return Err(DomainError::InvalidDegreesOfFreedom { dof });
        }
        if dof > LARGE_DOF {
            Ok(Self::Asymptotic {
                dof,
                normal: Normal::new(0.0, 1.0)
                    .map_err(|_| DomainError::InvalidDegreesOfFreedom { dof })?,
            })
        } else {
            StudentsT::new(0.0, 1.0, dof)
                .map(Self::Exact)
                .map_err(|_| DomainError::InvalidDegreesOfFreedom { dof })
        }
    }

    fn cdf(&self, t: f64) -> f64 {
        match self {
            Self::Exact(dist) => dist.cdf(t),
            Self::Asymptotic { dof, normal } => {
                let z = t * (1.0 - 1.0 / (4.0 * dof)) / (1.0 + t * t / (2.0 * dof)).sqrt();
                normal.cdf(z)
            }
        }
    }

    fn quantile(&self, p: f64) -> f64 {
        match self {
            Self::Exact(dist) => dist.inverse_cdf(p),
            Self::Asymptotic { dof, normal } => {
                let z = normal.inverse_cdf(p);
                z + (z.powi(3) + z) / (4.0 * dof)
                    + (5.0 * z.powi(5) + 16.0 * z.powi(3) + 3.0 * z) / (96.0 * dof.powi(2))
            }
        }
    }

    fn two_sided_p_value(&self, t_stat: f64) -> f64 {
        if t_stat == 0.0 {
            return 1.0;
        }
        (2.0 * (1.0 - self.cdf(t_stat.abs()))).clamp(0.0, 1.0)
    }
}
