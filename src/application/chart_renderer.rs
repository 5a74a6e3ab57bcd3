// Chart renderer - Maps the current selection and series to a chart description
use crate::domain::chart::{
    ChartData, ChartError, ChartSelection, PieWedge, Plot, TemperatureBin,
};
use crate::domain::reading::TemperatureSeries;

pub const PIE_BIN_COUNT: usize = 5;
pub const DEFAULT_SERIES_COLOR: &str = "#365341";
pub const SCATTER_COLOR: &str = "#1f77b4";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub color: String,
    pub pie_bins: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_SERIES_COLOR.to_string(),
            pie_bins: PIE_BIN_COUNT,
        }
    }
}

pub fn render_chart(
    selection: ChartSelection,
    series: &TemperatureSeries,
    options: &RenderOptions,
) -> Result<ChartData, ChartError> {
    match selection {
        ChartSelection::Line => Ok(render_line(series, options)),
        ChartSelection::Bar => Ok(render_bar(series, options)),
        ChartSelection::Pie => render_pie(series, options.pie_bins),
        ChartSelection::Scatter => Ok(render_scatter(series)),
    }
}

fn render_line(series: &TemperatureSeries, options: &RenderOptions) -> ChartData {
    ChartData::new(
        ChartSelection::Line.heading().to_string(),
        options.color.clone(),
        Plot::Line(series.points()),
    )
}

fn render_bar(series: &TemperatureSeries, options: &RenderOptions) -> ChartData {
    ChartData::new(
        ChartSelection::Bar.heading().to_string(),
        options.color.clone(),
        Plot::Bar(series.points()),
    )
}

fn render_scatter(series: &TemperatureSeries) -> ChartData {
    ChartData::new(
        ChartSelection::Scatter.heading().to_string(),
        SCATTER_COLOR.to_string(),
        Plot::Scatter(series.points()),
    )
}

fn render_pie(series: &TemperatureSeries, bin_count: usize) -> Result<ChartData, ChartError> {
    if series.is_empty() {
        return Err(ChartError::EmptySeries);
    }
    let bins = bin_temperatures(series, bin_count)?;
    let total = bins.iter().map(|b| b.count).sum::<usize>() as f64;

    let wedges = bins
        .iter()
        .map(|bin| PieWedge::new(bin.label(), bin.count, bin.count as f64 / total * 100.0))
        .collect();

    Ok(ChartData::new(
        ChartSelection::Pie.heading().to_string(),
        String::new(),
        Plot::Pie(wedges),
    ))
}

/// Partition the TC range into `bin_count` equal-width bins and count the
/// readings in each. Bins are `[lo, hi)` except the last, which also holds
/// the maximum. A zero-width range is widened by 0.1% on each side.
/// Non-finite readings are left out of every bin.
pub fn bin_temperatures(
    series: &TemperatureSeries,
    bin_count: usize,
) -> Result<Vec<TemperatureBin>, ChartError> {
    let (min, max) = series.temperature_range().ok_or(ChartError::EmptySeries)?;
    let bin_count = bin_count.max(1);

    let (lower, upper) = if max > min {
        (min, max)
    } else {
        let adjust = if min == 0.0 { 0.001 } else { min.abs() * 0.001 };
        (min - adjust, max + adjust)
    };
    let width = (upper - lower) / bin_count as f64;

    let mut bins: Vec<TemperatureBin> = (0..bin_count)
        .map(|i| {
            let last = i + 1 == bin_count;
            let hi = if last {
                upper
            } else {
                lower + width * (i + 1) as f64
            };
            TemperatureBin::new(lower + width * i as f64, hi, last)
        })
        .collect();

    // Place each reading by the stored edges so a bin only counts values its
    // own interval contains
    let last_bin = bin_count - 1;
    for tc in series.readings().iter().map(|r| r.tc).filter(|tc| tc.is_finite()) {
        let index = bins[..last_bin].partition_point(|bin| bin.upper <= tc);
        bins[index].count += 1;
    }

    Ok(bins)
}
