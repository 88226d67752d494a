use approx::assert_abs_diff_eq;
use delta_lift_core::DomainError;
use delta_lift_metrics::StatisticalAnalyzer;
use proptest::prelude::*;
use rstest::rstest;

// ===== T-Test Tests =====

#[test]
fn test_t_test_large_effect() {
    let result = StatisticalAnalyzer::t_test(5.0, 1.0, 0.05, 30.0).unwrap();

    assert_eq!(result.test_statistic, 5.0);
    assert!(result.p_value < 0.001);
    assert!(result.lcl > 0.0);
}

#[test]
fn test_t_test_sign_does_not_change_p_value() {
    let up = StatisticalAnalyzer::t_test(1.2, 0.5, 0.05, 14.5).unwrap();
    let down = StatisticalAnalyzer::t_test(-1.2, 0.5, 0.05, 14.5).unwrap();

    assert_abs_diff_eq!(up.p_value, down.p_value, epsilon = 1e-15);
    assert_abs_diff_eq!(up.width(), down.width(), epsilon = 1e-15);
}

#[test]
fn test_t_test_fractional_dof() {
    let low = StatisticalAnalyzer::t_test(2.0, 1.0, 0.05, 3.5).unwrap();
    let high = StatisticalAnalyzer::t_test(2.0, 1.0, 0.05, 4.5).unwrap();

    // Heavier tails at lower dof.
    assert!(low.p_value > high.p_value);
    assert!(low.width() > high.width());
}

#[test]
fn test_t_test_approaches_normal_for_large_dof() {
    let result = StatisticalAnalyzer::t_test(1.959964, 1.0, 0.05, 1.0e6).unwrap();

    // t_{0.975, 1e6} = 1.9599664
    assert_abs_diff_eq!(result.p_value, 0.0500003, epsilon = 1e-6);
    assert_abs_diff_eq!(result.width(), 2.0 * 1.9599664, epsilon = 1e-6);
}

// ===== Large Degrees of Freedom =====

fn cornish_fisher(z: f64, dof: f64) -> f64 {
    z + (z.powi(3) + z) / (4.0 * dof)
        + (5.0 * z.powi(5) + 16.0 * z.powi(3) + 3.0 * z) / (96.0 * dof.powi(2))
}

#[rstest]
#[case(0.05, 1.959963984540054, 2.0e4, 1.960082605)]
#[case(0.05, 1.959963984540054, 1.0e6, 1.959966357)]
#[case(0.05, 1.959963984540054, 1.0e7, 1.959964222)]
#[case(0.05, 1.959963984540054, 1.0e8, 1.959964008)]
#[case(0.01, 2.5758293035489, 1.0e6, 2.575834220)]
#[case(0.01, 2.5758293035489, 1.0e7, 2.575829795)]
#[case(0.01, 2.5758293035489, 1.0e8, 2.575829353)]
fn test_critical_value_large_dof(
    #[case] alpha: f64,
    #[case] z: f64,
    #[case] dof: f64,
    #[case] expected: f64,
) {
    let cv = StatisticalAnalyzer::critical_value(alpha, dof).unwrap();

    assert!(cv >= z, "t quantile {} fell below the normal quantile {}", cv, z);
    assert_abs_diff_eq!(cv, expected, epsilon = 1e-6);
    assert_abs_diff_eq!(cv, cornish_fisher(z, dof), epsilon = 1e-6);
}

#[rstest]
#[case(1.0e6)]
#[case(1.2e7)]
#[case(1.0e8)]
fn test_t_test_large_dof_is_consistent(#[case] dof: f64) {
    let cv = StatisticalAnalyzer::critical_value(0.05, dof).unwrap();
    let result = StatisticalAnalyzer::t_test(cv, 1.0, 0.05, dof).unwrap();

    // The interval edge sits exactly at the significance boundary.
    assert_abs_diff_eq!(result.p_value, 0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(result.lcl, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.width(), 2.0 * cv, epsilon = 1e-9);
    assert!(result.width() >= 2.0 * 1.959963984540054);
}

// ===== Critical Values =====

#[rstest]
#[case(0.05, 1.0, 12.706205)]
#[case(0.05, 5.0, 2.570582)]
#[case(0.10, 20.0, 1.724718)]
#[case(0.01, 30.0, 2.749996)]
fn test_critical_values(#[case] alpha: f64, #[case] dof: f64, #[case] expected: f64) {
    let cv = StatisticalAnalyzer::critical_value(alpha, dof).unwrap();
    assert_abs_diff_eq!(cv, expected, epsilon = 1e-4);
}

#[rstest]
#[case(0.10)]
#[case(0.05)]
#[case(0.01)]
fn test_smaller_alpha_widens_interval(#[case] alpha: f64) {
    let wider = StatisticalAnalyzer::t_test(0.4, 0.09, alpha / 2.0, 40.0).unwrap();
    let narrower = StatisticalAnalyzer::t_test(0.4, 0.09, alpha, 40.0).unwrap();

    assert!(wider.width() > narrower.width());
    assert_eq!(wider.p_value, narrower.p_value);
}

// ===== Error Conditions =====

#[test]
fn test_negative_variance() {
    assert_eq!(
        StatisticalAnalyzer::t_test(0.1, -1e-9, 0.05, 10.0),
        Err(DomainError::NegativeVariance { variance: -1e-9 })
    );
}

#[rstest]
#[case(0.0)]
#[case(-3.0)]
#[case(f64::INFINITY)]
fn test_invalid_dof(#[case] dof: f64) {
    assert!(matches!(
        StatisticalAnalyzer::t_test(0.1, 1.0, 0.05, dof),
        Err(DomainError::InvalidDegreesOfFreedom { .. })
    ));
}

#[test]
fn test_non_finite_metric() {
    assert!(matches!(
        StatisticalAnalyzer::t_test(f64::NAN, 1.0, 0.05, 10.0),
        Err(DomainError::NonFinite { field: "metric", .. })
    ));
}

// ===== Invariants =====

proptest! {
    #[test]
    fn test_interval_contains_metric(
        metric in -10.0f64..10.0,
        variance in 1e-8f64..100.0,
        dof in 1.0f64..100_000.0,
        alpha in 0.001f64..0.5,
    ) {
        let result = StatisticalAnalyzer::t_test(metric, variance, alpha, dof).unwrap();

        prop_assert!(result.lcl < metric);
        prop_assert!(metric < result.ucl);
        prop_assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_zero_variance_interval_is_degenerate(
        metric in -10.0f64..10.0,
        dof in 1.0f64..1000.0,
    ) {
        let result = StatisticalAnalyzer::t_test(metric, 0.0, 0.05, dof).unwrap();

        prop_assert_eq!(result.lcl, metric);
        prop_assert_eq!(result.ucl, metric);
    }
}
