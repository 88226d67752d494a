//! Lift sweeps and p-value charts

use anyhow::{bail, Context as _, Result};
use clap::Args;
use comfy_table::Cell;
use delta_lift_core::{LiftGrid, LiftSpec, SeriesRenderer, SweepConfig, SweepReport, TestKind};
use delta_lift_metrics::ScenarioSweep;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::ScenarioArgs;
use crate::chart::SvgChart;
use crate::config::ScenarioFile;
use crate::context::Context;
use crate::output::{
    format_number, format_percent, print_field, print_section, significance_cell, styled_table,
    TableDisplay,
};

#[derive(Debug, Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Scenario file (TOML) with a [scenario] table and optional [lifts];
    /// --var1/--var2 override its variances
    #[arg(short, long, conflicts_with_all = ["preset", "n1", "n2", "mu1"])]
    pub file: Option<PathBuf>,

    /// Comma-separated lifts, e.g. 0,0.01,0.02
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, conflicts_with_all = ["start", "stop", "step"])]
    pub lifts: Option<Vec<f64>>,

    /// First lift of an evenly spaced grid
    #[arg(long, allow_negative_numbers = true, requires_all = ["stop", "step"])]
    pub start: Option<f64>,

    /// Last lift of the grid (inclusive)
    #[arg(long, allow_negative_numbers = true, requires_all = ["start", "step"])]
    pub stop: Option<f64>,

    /// Grid spacing
    #[arg(long, requires_all = ["start", "stop"])]
    pub step: Option<f64>,

    /// Write the p-value chart to this SVG file
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

pub fn execute(ctx: &Context, args: SweepArgs) -> Result<()> {
    let (template, default_lifts, file_alpha, title) = match &args.file {
        Some(path) => {
            let file = ScenarioFile::load(path)?;
            let title = format!("p-value vs lift: {}", path.display());
            (
                args.scenario.override_variances(file.scenario),
                file.lifts,
                file.alpha,
                title,
            )
        }
        None => {
            let resolved = args
                .scenario
                .resolve()?
                .context("Provide a scenario with --file, --preset or --n1, --n2 and --mu1")?;
            let title = match resolved.preset {
                Some(preset) => format!("p-value vs lift: {}", preset.name),
                None => "p-value vs lift".to_string(),
            };
            (
                resolved.template,
                resolved.preset.map(|p| LiftSpec::Grid(p.grid)),
                None,
                title,
            )
        }
    };

    let lifts = match (args.lifts, args.start, args.stop, args.step) {
        (Some(lifts), ..) => lifts,
        (None, Some(start), Some(stop), Some(step)) => LiftGrid::new(start, stop, step).expand()?,
        _ => match default_lifts {
            Some(spec) => spec.resolve()?,
            None => bail!("No lifts to sweep: use --lifts or --start, --stop and --step"),
        },
    };

    let config = SweepConfig::new(ctx.alpha(file_alpha), lifts);
    let report = ScenarioSweep::run(&template, &config)?;

    if report.points.is_empty() {
        bail!("All {} lifts in the sweep failed", report.failures.len());
    }

    ctx.output.write(&SweepDisplay::new(&report))?;
    if !report.is_complete() {
        ctx.output.warning(&format!(
            "{} of {} lifts could not be evaluated",
            report.failures.len(),
            report.evaluated()
        ));
    }

    if let Some(path) = &args.chart {
        let chart = SvgChart::new(ctx.settings.chart_width, ctx.settings.chart_height, title);
        let svg = chart.render(&report.series(), report.alpha)?;
        fs::write(path, svg).with_context(|| format!("Failed to write chart to {:?}", path))?;
        ctx.output
            .success(&format!("Chart written to {}", path.display()));
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MinimumDetectableLift {
    pub absolute: Option<f64>,
    pub relative: Option<f64>,
}

/// Sweep report with the smallest significant lift per test
#[derive(Debug, Serialize)]
pub struct SweepDisplay<'a> {
    #[serde(flatten)]
    pub report: &'a SweepReport,
    pub minimum_detectable_lift: MinimumDetectableLift,
}

impl<'a> SweepDisplay<'a> {
    pub fn new(report: &'a SweepReport) -> Self {
        Self {
            report,
            minimum_detectable_lift: MinimumDetectableLift {
                absolute: report.minimum_detectable_lift(TestKind::Absolute),
                relative: report.minimum_detectable_lift(TestKind::Relative),
            },
        }
    }
}

fn format_mdl(lift: Option<f64>) -> String {
    lift.map(format_percent)
        .unwrap_or_else(|| "not reached".to_string())
}

impl TableDisplay for SweepDisplay<'_> {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(self.report.points.len()),
            Cell::new(self.report.failures.len()),
            Cell::new(format_mdl(self.minimum_detectable_lift.absolute)),
            Cell::new(format_mdl(self.minimum_detectable_lift.relative)),
        ]
    }

    fn display_single(&self) {
        let alpha = self.report.alpha;
        let mut table = styled_table(&[
            "#",
            "Lift",
            "Abs. diff",
            "Abs. p-value",
            "Rel. p-value",
            "Rel. CI",
            "dof",
        ]);
        for point in &self.report.points {
            let comparison = &point.comparison;
            table.add_row(vec![
                Cell::new(point.index),
                Cell::new(format_percent(point.lift)),
                Cell::new(format_number(comparison.absolute.metric)),
                significance_cell(comparison.absolute.p_value, alpha),
                significance_cell(comparison.relative.p_value, alpha),
                Cell::new(format!(
                    "[{}, {}]",
                    format_percent(comparison.relative.lcl),
                    format_percent(comparison.relative.ucl)
                )),
                Cell::new(format!("{:.1}", comparison.dof)),
            ]);
        }
        println!("{table}");

        if !self.report.failures.is_empty() {
            print_section("Skipped lifts");
            for failure in &self.report.failures {
                print_field(
                    &format!("#{} ({})", failure.index, format_percent(failure.lift)),
                    &failure.error.to_string(),
                );
            }
        }

        print_section("Summary");
        print_field("Alpha", &alpha.to_string());
        print_field(
            "Evaluated",
            &format!(
                "{} of {} lifts",
                self.report.points.len(),
                self.report.evaluated()
            ),
        );
        print_field(
            "Smallest significant lift (absolute)",
            &format_mdl(self.minimum_detectable_lift.absolute),
        );
        print_field(
            "Smallest significant lift (relative)",
            &format_mdl(self.minimum_detectable_lift.relative),
        );
    }

    fn display_compact(&self) {
        for point in &self.report.points {
            println!(
                "{}\t{:.6}\t{:.6}",
                point.lift, point.comparison.absolute.p_value, point.comparison.relative.p_value
            );
        }
    }
}
