use delta_lift_core::{Result, ScenarioTemplate, SweepConfig, SweepReport};
use validator::Validate;

use crate::delta::TwoSampleComparator;

pub struct ScenarioSweep;

impl ScenarioSweep {
    /// Evaluate `template` at every lift in `config`.
    ///
    /// A lift whose scenario is invalid, or whose test fails, is recorded as a
    /// failure and the sweep moves on to the next lift.
    pub fn run(template: &ScenarioTemplate, config: &SweepConfig) -> Result<SweepReport> {
        config.validate()?;
        let comparator = TwoSampleComparator::new(config.alpha)?;

        let mut report = SweepReport::new(config.alpha, *template);
        for (index, &lift) in config.lifts.iter().enumerate() {
            let outcome = template
                .at_lift(lift)
                .and_then(|scenario| comparator.compare(&scenario));

            if let Err(err) = &outcome {
                tracing::warn!(index, lift, "Sweep point failed: {}", err);
            }
            report.record(index, lift, outcome);
        }

        tracing::info!(
            "Sweep finished: {} of {} lifts evaluated, {} failed",
            report.points.len(),
            report.evaluated(),
            report.failures.len()
        );

        Ok(report)
    }
}
