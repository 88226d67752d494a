//! SVG line chart of p-values against lift

use delta_lift_core::{CoreError, PValueSeries, Result, SeriesRenderer};
use std::fmt::{self, Write as _};

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;
const PALETTE: [&str; 4] = ["#1f77b4", "#d62728", "#2ca02c", "#9467bd"];

/// Renders p-value series as a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgChart {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl SvgChart {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
        }
    }

    fn plot_area(&self) -> (f64, f64) {
        (
            self.width as f64 - MARGIN_LEFT - MARGIN_RIGHT,
            self.height as f64 - MARGIN_TOP - MARGIN_BOTTOM,
        )
    }
}

/// Linear map from the data range onto the plot area
struct Scale {
    x_min: f64,
    x_max: f64,
    plot_width: f64,
    plot_height: f64,
}

impl Scale {
    fn x(&self, lift: f64) -> f64 {
        MARGIN_LEFT + (lift - self.x_min) / (self.x_max - self.x_min) * self.plot_width
    }

    /// p-values always span [0, 1].
    fn y(&self, p: f64) -> f64 {
        MARGIN_TOP + (1.0 - p.clamp(0.0, 1.0)) * self.plot_height
    }
}

impl SeriesRenderer for SvgChart {
    type Output = String;

    fn render(&self, series: &[PValueSeries], threshold: f64) -> Result<String> {
        if series.iter().all(|s| s.is_empty()) {
            return Err(CoreError::Render("no data points to plot".to_string()));
        }
        if let Some(bad) = series.iter().find(|s| s.lifts.len() != s.p_values.len()) {
            return Err(CoreError::Render(format!(
                "series '{}' has {} lifts but {} p-values",
                bad.label,
                bad.lifts.len(),
                bad.p_values.len()
            )));
        }

        let (plot_width, plot_height) = self.plot_area();
        if plot_width <= 0.0 || plot_height <= 0.0 {
            return Err(CoreError::Render(format!(
                "chart {}x{} is too small",
                self.width, self.height
            )));
        }

        let (mut x_min, mut x_max) = series
            .iter()
            .flat_map(|s| s.lifts.iter().copied())
            .filter(|x| x.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        if !x_min.is_finite() {
            return Err(CoreError::Render("no finite lifts to plot".to_string()));
        }
        if x_min == x_max {
            x_min -= 0.01;
            x_max += 0.01;
        }

        let scale = Scale {
            x_min,
            x_max,
            plot_width,
            plot_height,
        };

        let mut svg = String::new();
        self.write_document(&mut svg, &scale, series, threshold)
            .map_err(|err| CoreError::Render(format!("failed to format SVG: {}", err)))?;
        Ok(svg)
    }
}

impl SvgChart {
    fn write_document(
        &self,
        svg: &mut String,
        scale: &Scale,
        series: &[PValueSeries],
        threshold: f64,
    ) -> fmt::Result {
        let (x_min, x_max) = (scale.x_min, scale.x_max);
        let (plot_width, plot_height) = (scale.plot_width, scale.plot_height);

        writeln!(svg, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            self.width, self.height, self.width, self.height
        )?;
        svg.write_str("  <style>\n")?;
        svg.write_str("    .frame { stroke: #333; fill: none; }\n")?;
        svg.write_str("    .grid { stroke: #ddd; }\n")?;
        svg.write_str("    .label { font-family: monospace; font-size: 12px; fill: #333; }\n")?;
        svg.write_str("    .title { font-family: monospace; font-size: 15px; font-weight: bold; }\n")?;
        svg.write_str("  </style>\n")?;
        svg.write_str("  <rect width=\"100%\" height=\"100%\" fill=\"#f8f8f8\"/>\n")?;
        writeln!(
            svg,
            "  <text class=\"title\" x=\"{:.1}\" y=\"28\">{}</text>",
            MARGIN_LEFT,
            escape(&self.title)
        )?;

        // Axes, gridlines and tick labels
        for i in 0..=TICKS {
            let frac = i as f64 / TICKS as f64;
            let y = scale.y(frac);
            writeln!(
                svg,
                "  <line class=\"grid\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\"/>",
                MARGIN_LEFT,
                y,
                MARGIN_LEFT + plot_width,
                y
            )?;
            writeln!(
                svg,
                "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{:.1}</text>",
                MARGIN_LEFT - 8.0,
                y + 4.0,
                frac
            )?;

            let lift = x_min + frac * (x_max - x_min);
            let x = scale.x(lift);
            writeln!(
                svg,
                "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{:.1}%</text>",
                x,
                MARGIN_TOP + plot_height + 18.0,
                lift * 100.0
            )?;
        }
        writeln!(
            svg,
            "  <rect class=\"frame\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\"/>",
            MARGIN_LEFT, MARGIN_TOP, plot_width, plot_height
        )?;
        writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Lift</text>",
            MARGIN_LEFT + plot_width / 2.0,
            self.height as f64 - 15.0
        )?;
        writeln!(
            svg,
            "  <text class=\"label\" x=\"15\" y=\"{:.1}\" transform=\"rotate(-90 15 {:.1})\" text-anchor=\"middle\">p-value</text>",
            MARGIN_TOP + plot_height / 2.0,
            MARGIN_TOP + plot_height / 2.0
        )?;

        // Significance threshold
        let y = scale.y(threshold);
        writeln!(
            svg,
            "  <line class=\"threshold\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#888\" stroke-dasharray=\"6 4\"/>",
            MARGIN_LEFT,
            y,
            MARGIN_LEFT + plot_width,
            y
        )?;
        writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">alpha = {}</text>",
            MARGIN_LEFT + plot_width - 4.0,
            y - 4.0,
            threshold
        )?;

        // Series and legend
        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<String> = s
                .points()
                .filter(|(x, p)| x.is_finite() && p.is_finite())
                .map(|(x, p)| format!("{:.2},{:.2}", scale.x(x), scale.y(p)))
                .collect();

            writeln!(
                svg,
                "  <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/>",
                color,
                points.join(" ")
            )?;

            let legend_y = MARGIN_TOP + 16.0 + i as f64 * 18.0;
            let legend_x = MARGIN_LEFT + 12.0;
            writeln!(
                svg,
                "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>",
                legend_x,
                legend_y - 4.0,
                legend_x + 20.0,
                legend_y - 4.0,
                color
            )?;
            writeln!(
                svg,
                "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\">{}</text>",
                legend_x + 26.0,
                legend_y,
                escape(&s.label)
            )?;
        }

        svg.write_str("</svg>\n")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
