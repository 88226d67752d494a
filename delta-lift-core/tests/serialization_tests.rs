use delta_lift_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

// ===== Scenario Serialization Tests =====

#[test]
fn test_scenario_deserialization_validates() {
    let scenario: ExperimentScenario = serde_json::from_value(json!({
        "n1": 700000,
        "n2": 710000,
        "mu1": 0.002,
        "lift": 0.07
    }))
    .unwrap();

    assert_eq!(scenario.n2(), 710_000);
    assert_eq!(scenario.variance_source(Group::Treatment), VarianceSource::Binomial);

    let err = serde_json::from_value::<ExperimentScenario>(json!({
        "n1": 1,
        "n2": 100,
        "mu1": 0.2
    }))
    .unwrap_err();
    assert!(err.to_string().contains("Invalid sample size"));
}

#[test]
fn test_scenario_serialization_omits_derived_variances() {
    let scenario = ExperimentScenario::from_parts(100, 120, 0.2, 0.1, Some(0.3), None).unwrap();
    let value = serde_json::to_value(scenario).unwrap();

    assert_eq!(
        value,
        json!({
            "n1": 100,
            "n2": 120,
            "mu1": 0.2,
            "lift": 0.1,
            "var1": 0.3
        })
    );
}

#[test]
fn test_scenario_from_toml_defaults_lift_to_zero() {
    let scenario: ExperimentScenario = toml::from_str(
        r#"
        n1 = 46000
        n2 = 46700
        mu1 = 0.33
        var1 = 0.1089
        var2 = 0.1156
        "#,
    )
    .unwrap();

    assert_eq!(scenario.lift(), 0.0);
    assert_eq!(scenario.treatment_mean(), 0.33);
    assert_eq!(scenario.control_variance(), 0.1089);
}

#[test]
fn test_explicit_variance_allows_non_proportion_means() {
    let toml_err = toml::from_str::<ExperimentScenario>("n1 = 10\nn2 = 10\nmu1 = 12.5\n");
    assert!(toml_err.is_err());

    let scenario: ExperimentScenario =
        toml::from_str("n1 = 10\nn2 = 10\nmu1 = 12.5\nvar1 = 4.0\nvar2 = 4.0\n").unwrap();
    assert_eq!(scenario.control_mean(), 12.5);
}

#[test]
fn test_template_roundtrip_through_toml() {
    let template = ScenarioTemplate::new(46_000, 46_700, 0.33).with_variances(0.1089, 0.1156);
    let text = toml::to_string(&template).unwrap();
    let parsed: ScenarioTemplate = toml::from_str(&text).unwrap();

    assert_eq!(parsed, template);
}

// ===== Sweep Serialization Tests =====

#[test]
fn test_lift_spec_from_toml_tables() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        lifts: LiftSpec,
    }

    let values: Wrapper = toml::from_str("[lifts]\nvalues = [0.01, 0.02]\n").unwrap();
    assert_eq!(values.lifts.resolve().unwrap(), vec![0.01, 0.02]);

    let grid: Wrapper = toml::from_str("[lifts]\nstart = 0.0\nstop = 0.1\nstep = 0.05\n").unwrap();
    assert_eq!(grid.lifts.resolve().unwrap(), vec![0.0, 0.05, 0.1]);
}

#[rstest]
#[case(DomainError::ZeroBaseline, "zero_baseline")]
#[case(DomainError::NegativeVariance { variance: -1.0 }, "negative_variance")]
#[case(DomainError::InvalidDegreesOfFreedom { dof: 0.0 }, "invalid_degrees_of_freedom")]
#[case(DomainError::InvalidSignificance { alpha: 2.0 }, "invalid_significance")]
#[case(
    DomainError::InvalidSampleSize { group: Group::Treatment, size: 0 },
    "invalid_sample_size"
)]
#[case(
    DomainError::ProportionOutOfRange { group: Group::Control, mean: 1.5 },
    "proportion_out_of_range"
)]
#[case(DomainError::NonFinite { field: "mu1", value: f64::NAN }, "non_finite")]
fn test_domain_error_kinds(#[case] error: DomainError, #[case] kind: &str) {
    let value = serde_json::to_value(&error).unwrap();
    assert_eq!(value["kind"], kind);
}

#[test]
fn test_preset_serialization() {
    let preset = find_preset("unequal-variance").unwrap();
    let value = serde_json::to_value(preset).unwrap();

    assert_eq!(value["name"], "unequal-variance");
    assert_eq!(value["template"]["n2"], 46_700);
    assert_eq!(value["grid"]["step"], 0.001);
}

// ===== Property Tests =====

proptest! {
    #[test]
    fn prop_binomial_scenarios_are_consistent(
        n1 in 2u64..1_000_000,
        n2 in 2u64..1_000_000,
        mu1 in 0.001f64..0.9,
        lift in -0.5f64..0.1,
    ) {
        let scenario = ExperimentScenario::new(n1, n2, mu1, lift).unwrap();

        prop_assert!((scenario.treatment_mean() - mu1 * (1.0 + lift)).abs() < 1e-15);
        for group in [Group::Control, Group::Treatment] {
            let variance = scenario.variance(group);
            prop_assert!((0.0..=0.25).contains(&variance));
        }
    }

    #[test]
    fn prop_with_lift_keeps_variance_policy(
        n1 in 2u64..10_000,
        mu1 in 0.01f64..0.5,
        lift in -0.9f64..0.9,
        var2 in proptest::option::of(0.0f64..1.0),
    ) {
        let scenario = ExperimentScenario::from_parts(n1, n1 + 1, mu1, 0.0, None, var2).unwrap();
        let moved = scenario.with_lift(lift).unwrap();

        prop_assert_eq!(moved.lift(), lift);
        prop_assert_eq!(moved.variance_source(Group::Control), VarianceSource::Binomial);
        prop_assert_eq!(
            moved.variance_source(Group::Treatment),
            scenario.variance_source(Group::Treatment)
        );
        prop_assert_eq!(moved.with_lift(0.0).unwrap(), scenario);
    }
}
