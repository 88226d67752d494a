//! Built-in scenario listing

use anyhow::Result;
use comfy_table::Cell;
use delta_lift_core::{presets, LiftGrid, Preset};
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_number, format_percent, print_field, print_section, TableDisplay};

pub fn execute(ctx: &Context) -> Result<()> {
    let items: Vec<PresetDisplay> = presets().iter().map(PresetDisplay::from).collect();
    ctx.output.write_list(
        &items,
        &["Name", "n1", "n2", "mu1", "Variances", "Default lift", "Sweep"],
    )
}

#[derive(Debug, Serialize)]
pub struct PresetDisplay {
    pub name: &'static str,
    pub description: &'static str,
    pub n1: u64,
    pub n2: u64,
    pub mu1: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var2: Option<f64>,
    pub default_lift: f64,
    pub grid: LiftGrid,
}

impl From<&Preset> for PresetDisplay {
    fn from(preset: &Preset) -> Self {
        Self {
            name: preset.name,
            description: preset.description,
            n1: preset.template.n1,
            n2: preset.template.n2,
            mu1: preset.template.mu1,
            var1: preset.template.var1,
            var2: preset.template.var2,
            default_lift: preset.default_lift,
            grid: preset.grid,
        }
    }
}

impl PresetDisplay {
    fn variances(&self) -> String {
        match (self.var1, self.var2) {
            (Some(v1), Some(v2)) => format!("{} / {}", format_number(v1), format_number(v2)),
            (Some(v1), None) => format!("{} / binomial", format_number(v1)),
            (None, Some(v2)) => format!("binomial / {}", format_number(v2)),
            (None, None) => "binomial".to_string(),
        }
    }

    fn sweep(&self) -> String {
        format!(
            "{} .. {} by {}",
            format_percent(self.grid.start),
            format_percent(self.grid.stop),
            format_percent(self.grid.step)
        )
    }
}

impl TableDisplay for PresetDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(self.name),
            Cell::new(self.n1),
            Cell::new(self.n2),
            Cell::new(format_number(self.mu1)),
            Cell::new(self.variances()),
            Cell::new(format_percent(self.default_lift)),
            Cell::new(self.sweep()),
        ]
    }

    fn display_single(&self) {
        print_section(self.name);
        print_field("Description", self.description);
        print_field("Sample sizes", &format!("{} / {}", self.n1, self.n2));
        print_field("Control mean", &format_number(self.mu1));
        print_field("Variances", &self.variances());
        print_field("Default lift", &format_percent(self.default_lift));
        print_field("Sweep", &self.sweep());
    }

    fn display_compact(&self) {
        println!("{}\t{}", self.name, self.description);
    }
}
