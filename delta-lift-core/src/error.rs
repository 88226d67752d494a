use serde::Serialize;
use thiserror::Error;

use crate::domain::Group;

/// Failures of a single statistical evaluation.
///
/// These abort the scenario that raised them and are reported to the caller
/// unchanged; nothing is clamped or substituted.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainError {
    #[error("Invalid sample size: {group} group has n = {size}, need n > 1")]
    InvalidSampleSize { group: Group, size: u64 },

    #[error("Zero baseline: control mean must be non-zero")]
    ZeroBaseline,

    #[error("Negative variance: {variance}")]
    NegativeVariance { variance: f64 },

    #[error("Invalid degrees of freedom: {dof}")]
    InvalidDegreesOfFreedom { dof: f64 },

    #[error("Invalid significance level: {alpha} (expected 0 < alpha < 1)")]
    InvalidSignificance { alpha: f64 },

    #[error("Binomial variance needs a proportion in [0, 1], but the {group} mean is {mean}")]
    ProportionOutOfRange { group: Group, mean: f64 },

    #[error("Non-finite input: {field} = {value}")]
    NonFinite { field: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Reject NaN and infinities before they reach any formula.
pub fn ensure_finite(field: &'static str, value: f64) -> DomainResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite { field, value })
    }
}

/// Significance levels must lie strictly inside (0, 1).
pub fn ensure_alpha(alpha: f64) -> DomainResult<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(DomainError::InvalidSignificance { alpha })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_messages() {
        let err = DomainError::InvalidSampleSize {
            group: Group::Treatment,
            size: 1,
        };
        assert_eq!(
            err.to_string(),
            "Invalid sample size: treatment group has n = 1, need n > 1"
        );
        assert_eq!(
            DomainError::ZeroBaseline.to_string(),
            "Zero baseline: control mean must be non-zero"
        );
    }

    #[test]
    fn test_domain_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(DomainError::NegativeVariance { variance: -0.5 }).unwrap();
        assert_eq!(json["kind"], "negative_variance");
        assert_eq!(json["variance"], -0.5);

        let json = serde_json::to_value(DomainError::ZeroBaseline).unwrap();
        assert_eq!(json["kind"], "zero_baseline");
    }

    #[test]
    fn test_core_error_wraps_domain_error() {
        let err: CoreError = DomainError::ZeroBaseline.into();
        assert!(matches!(err, CoreError::Domain(DomainError::ZeroBaseline)));
        assert_eq!(err.to_string(), DomainError::ZeroBaseline.to_string());
    }

    #[test]
    fn test_ensure_alpha_bounds() {
        assert!(ensure_alpha(0.05).is_ok());
        assert!(ensure_alpha(0.0).is_err());
        assert!(ensure_alpha(1.0).is_err());
        assert!(ensure_alpha(f64::NAN).is_err());
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("mu1", 0.2), Ok(0.2));
        assert!(matches!(
            ensure_finite("mu1", f64::INFINITY),
            Err(DomainError::NonFinite { field: "mu1", .. })
        ));
    }
}
