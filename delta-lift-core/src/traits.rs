use crate::domain::PValueSeries;
use crate::error::Result;

/// Presentation seam: turns p-value series into a chart.
///
/// Implementations receive `(lift, p-value, label)` series and the
/// significance threshold to draw as a reference line.
pub trait SeriesRenderer {
    type Output;

    fn render(&self, series: &[PValueSeries], threshold: f64) -> Result<Self::Output>;
}
