use serde::Serialize;

use super::scenario::ScenarioTemplate;
use super::sweep::LiftGrid;

/// A named, hand-specified experiment used for demonstrations.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub template: ScenarioTemplate,
    pub default_lift: f64,
    pub grid: LiftGrid,
}

pub const PRESETS: [Preset; 2] = [
    Preset {
        name: "low-baseline",
        description: "0.2% conversion rate, ~700k users per arm, binomial variances",
        template: ScenarioTemplate {
            n1: 700_000,
            n2: 710_000,
            mu1: 0.002,
            var1: None,
            var2: None,
        },
        default_lift: 0.07,
        grid: LiftGrid {
            start: 0.0,
            stop: 0.1,
            step: 0.005,
        },
    },
    Preset {
        name: "unequal-variance",
        description: "33% baseline, ~46k users per arm, explicit variances 0.33^2 and 0.34^2",
        template: ScenarioTemplate {
            n1: 46_000,
            n2: 46_700,
            mu1: 0.33,
            var1: Some(0.33 * 0.33),
            var2: Some(0.34 * 0.34),
        },
        default_lift: 0.013,
        grid: LiftGrid {
            start: 0.0,
            stop: 0.03,
            step: 0.001,
        },
    },
];

pub fn presets() -> &'static [Preset] {
    &PRESETS
}

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
