//! Single-scenario comparison

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;
use delta_lift_core::{
    ComparisonResult, ExperimentScenario, Group, ScenarioSpec, TestKind, TestResult,
    VarianceSource,
};
use delta_lift_metrics::TwoSampleComparator;
use serde::Serialize;

use super::ScenarioArgs;
use crate::context::Context;
use crate::output::{
    format_number, format_percent, print_field, print_section, significance_badge,
    significance_cell, TableDisplay,
};

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Relative lift of the treatment mean, e.g. 0.07 for +7% (defaults to the preset's lift)
    #[arg(short, long, allow_negative_numbers = true)]
    pub lift: Option<f64>,
}

pub fn execute(ctx: &Context, args: CompareArgs) -> Result<()> {
    let resolved = args
        .scenario
        .resolve()?
        .context("Provide a scenario with --preset or --n1, --n2 and --mu1")?;
    let lift = args
        .lift
        .or(resolved.preset.map(|p| p.default_lift))
        .context("--lift is required unless a preset is used")?;

    let scenario = resolved.template.at_lift(lift)?;
    let comparator = TwoSampleComparator::new(ctx.alpha(None))?;
    let result = comparator.compare(&scenario)?;

    ctx.output
        .write(&ComparisonDisplay::new(&scenario, result, comparator.alpha()))
}

/// Comparison together with the scenario it was computed for
#[derive(Debug, Serialize)]
pub struct ComparisonDisplay {
    pub scenario: ScenarioSpec,
    pub control_variance: f64,
    pub treatment_variance: f64,
    pub variance_source: [VarianceSource; 2],
    pub alpha: f64,
    #[serde(flatten)]
    pub result: ComparisonResult,
}

impl ComparisonDisplay {
    pub fn new(scenario: &ExperimentScenario, result: ComparisonResult, alpha: f64) -> Self {
        Self {
            scenario: ScenarioSpec::from(*scenario),
            control_variance: scenario.control_variance(),
            treatment_variance: scenario.treatment_variance(),
            variance_source: [
                scenario.variance_source(Group::Control),
                scenario.variance_source(Group::Treatment),
            ],
            alpha,
            result,
        }
    }

    fn group_summary(&self, n: u64, mean: f64, variance: f64, source: VarianceSource) -> String {
        let source = match source {
            VarianceSource::Explicit => "explicit",
            VarianceSource::Binomial => "binomial",
        };
        format!(
            "n = {}, mean = {}, variance = {} ({})",
            n,
            format_number(mean),
            format_number(variance),
            source
        )
    }

    fn print_test(&self, kind: TestKind) {
        let test: &TestResult = self.result.get(kind);
        let format_value = |v: f64| match kind {
            TestKind::Absolute => format_number(v),
            TestKind::Relative => format_percent(v),
        };

        print_section(kind.label());
        print_field("Estimate", &format_value(test.metric));
        print_field("Std. error", &format_number(test.std_error));
        print_field("t statistic", &format!("{:.4}", test.test_statistic));
        print_field("p-value", &significance_badge(test.p_value, self.alpha));
        print_field(
            &format!("{:.0}% CI", (1.0 - self.alpha) * 100.0),
            &format!("[{}, {}]", format_value(test.lcl), format_value(test.ucl)),
        );
    }
}

impl TableDisplay for ComparisonDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(format_percent(self.scenario.lift)),
            Cell::new(format!("{:.2}", self.result.dof)),
            significance_cell(self.result.absolute.p_value, self.alpha),
            significance_cell(self.result.relative.p_value, self.alpha),
        ]
    }

    fn display_single(&self) {
        print_section("Scenario");
        print_field(
            "Control",
            &self.group_summary(
                self.scenario.n1,
                self.scenario.mu1,
                self.control_variance,
                self.variance_source[0],
            ),
        );
        print_field(
            "Treatment",
            &self.group_summary(
                self.scenario.n2,
                self.result.treatment_mean,
                self.treatment_variance,
                self.variance_source[1],
            ),
        );
        print_field("Lift", &format_percent(self.scenario.lift));
        print_field("Degrees of freedom", &format!("{:.2}", self.result.dof));
        print_field("Alpha", &self.alpha.to_string());

        for kind in TestKind::ALL {
            self.print_test(kind);
        }

        let absolute = self.result.absolute.is_significant(self.alpha);
        let relative = self.result.relative.is_significant(self.alpha);
        if absolute != relative {
            println!(
                "\n{}",
                "The absolute and relative tests disagree at this significance level.".yellow()
            );
        }
    }

    fn display_compact(&self) {
        println!(
            "lift={} dof={:.2} abs_p={:.6} rel_p={:.6}",
            format_percent(self.scenario.lift),
            self.result.dof,
            self.result.absolute.p_value,
            self.result.relative.p_value
        );
    }
}
