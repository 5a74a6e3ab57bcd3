// SVG drawing of chart descriptions
use crate::domain::chart::{ChartData, ChartError, PieWedge, Plot};
use crate::domain::reading::TimeSeriesPoint;
use chrono::DateTime;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

const FALLBACK_COLOR: RGBColor = RGBColor(0x36, 0x53, 0x41);
const PIE_PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];
const ONE_MINUTE_MS: f64 = 60_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marks {
    Line,
    Bars,
    Points,
}

#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn render(&self, chart: &ChartData) -> Result<String, ChartError> {
        let color = parse_hex_color(&chart.color).unwrap_or(FALLBACK_COLOR);

        match &chart.plot {
            Plot::Line(points) => self.draw_time_series(points, color, Marks::Line),
            Plot::Bar(points) => self.draw_time_series(points, color, Marks::Bars),
            Plot::Scatter(points) => self.draw_time_series(points, color, Marks::Points),
            Plot::Pie(wedges) => self.draw_pie(wedges),
        }
    }

    fn draw_time_series(
        &self,
        points: &[TimeSeriesPoint],
        color: RGBColor,
        marks: Marks,
    ) -> Result<String, ChartError> {
        let (x_range, y_range) = axis_ranges(points, marks == Marks::Bars);
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let mut chart = ChartBuilder::on(&root)
                .margin(16)
                .x_label_area_size(48)
                .y_label_area_size(56)
                .build_cartesian_2d(x_range.clone(), y_range)
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .x_labels(6)
                .y_labels(8)
                .x_label_formatter(&format_time_label)
                .x_desc("timestamp")
                .y_desc("TC (°C)")
                .draw()
                .map_err(draw_error)?;

            let coords = points.iter().map(|p| (p.time_ms as f64, p.value));
            match marks {
                Marks::Line => {
                    chart
                        .draw_series(LineSeries::new(coords, color.stroke_width(2)))
                        .map_err(draw_error)?;
                }
                Marks::Points => {
                    chart
                        .draw_series(coords.map(|(x, y)| Circle::new((x, y), 3, color.filled())))
                        .map_err(draw_error)?;
                }
                Marks::Bars => {
                    let slot = (x_range.end - x_range.start) / points.len().max(1) as f64;
                    let half = slot * 0.4;
                    chart
                        .draw_series(coords.map(|(x, y)| {
                            Rectangle::new([(x - half, 0.0), (x + half, y)], color.filled())
                        }))
                        .map_err(draw_error)?;
                }
            }

            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }

    /// Wedges run counter-clockwise from three o'clock. Zero-count wedges
    /// draw nothing but keep their label.
    fn draw_pie(&self, wedges: &[PieWedge]) -> Result<String, ChartError> {
        let total: usize = wedges.iter().map(|w| w.count).sum();
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let center = (self.width as f64 / 2.0, self.height as f64 / 2.0);
            let radius = self.width.min(self.height) as f64 * 0.35;
            let centered = TextStyle::from(("sans-serif", 13).into_font())
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));

            let mut start = 0.0_f64;
            for (i, wedge) in wedges.iter().enumerate() {
                let sweep = if total == 0 {
                    0.0
                } else {
                    wedge.count as f64 / total as f64 * 2.0 * PI
                };
                let color = PIE_PALETTE[i % PIE_PALETTE.len()];

                if sweep > 0.0 {
                    let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
                    let mut outline = vec![to_pixel(center, 0.0, 0.0)];
                    outline.extend((0..=steps).map(|s| {
                        to_pixel(center, radius, start + sweep * s as f64 / steps as f64)
                    }));
                    root.draw(&Polygon::new(outline, color.filled()))
                        .map_err(draw_error)?;
                }

                let mid = start + sweep / 2.0;
                root.draw(&Text::new(
                    wedge.label.clone(),
                    to_pixel(center, radius * 1.2, mid),
                    centered.clone(),
                ))
                .map_err(draw_error)?;
                if sweep > 0.0 {
                    root.draw(&Text::new(
                        wedge.percentage_label(),
                        to_pixel(center, radius * 0.6, mid),
                        centered.clone(),
                    ))
                    .map_err(draw_error)?;
                }

                start += sweep;
            }

            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }
}

fn draw_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}

fn to_pixel(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()).round() as i32,
        (center.1 - radius * angle.sin()).round() as i32,
    )
}

fn format_time_label(time_ms: &f64) -> String {
    DateTime::from_timestamp_millis(*time_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Axis ranges covering every point. Bars always include the zero line.
/// Empty or single-valued data gets a small non-empty range.
fn axis_ranges(points: &[TimeSeriesPoint], include_zero: bool) -> (Range<f64>, Range<f64>) {
    let Some(first) = points.first() else {
        return (0.0..ONE_MINUTE_MS, 0.0..1.0);
    };

    let init = (
        first.time_ms as f64,
        first.time_ms as f64,
        first.value,
        first.value,
    );
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        points.iter().fold(init, |(x0, x1, y0, y1), p| {
            let x = p.time_ms as f64;
            (x0.min(x), x1.max(x), y0.min(p.value), y1.max(p.value))
        });

    if include_zero {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= ONE_MINUTE_MS;
        x_max += ONE_MINUTE_MS;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    // Bars need room on both sides of the first and last slot
    let x_pad = if include_zero {
        (x_max - x_min) / points.len() as f64
    } else {
        0.0
    };
    let y_pad = (y_max - y_min) * 0.05;

    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}

/// `#rrggbb` to a plotters colour
pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartSelection;

    fn points() -> Vec<TimeSeriesPoint> {
        vec![
            TimeSeriesPoint::new(1_704_448_800_000, 21.5),
            TimeSeriesPoint::new(1_704_445_200_000, 19.25),
            TimeSeriesPoint::new(1_704_454_200_000, 23.0),
        ]
    }

    fn chart(plot: Plot) -> ChartData {
        ChartData::new("Temperature".to_string(), "#365341".to_string(), plot)
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#365341"), Some(RGBColor(0x36, 0x53, 0x41)));
        assert_eq!(parse_hex_color("365341"), None);
        assert_eq!(parse_hex_color("#36534"), None);
        assert_eq!(parse_hex_color("#zz5341"), None);
    }

    #[test]
    fn test_axis_ranges_cover_points() {
        let (x, y) = axis_ranges(&points(), false);
        assert!(x.start <= 1_704_445_200_000.0 && x.end >= 1_704_454_200_000.0);
        assert!(y.start < 19.25 && y.end > 23.0);

        let (_, y) = axis_ranges(&points(), true);
        assert!(y.start <= 0.0);
    }

    #[test]
    fn test_axis_ranges_degenerate() {
        let (x, y) = axis_ranges(&[], false);
        assert!(x.end > x.start && y.end > y.start);

        let (x, y) = axis_ranges(&[TimeSeriesPoint::new(0, 5.0)], false);
        assert!(x.end > x.start && y.end > y.start);
    }

    #[test]
    fn test_time_labels() {
        assert_eq!(format_time_label(&1_704_448_800_000.0), "2024-01-05 10:00");
    }

    #[test]
    fn test_render_time_series_charts() {
        let renderer = SvgChartRenderer::new(640, 360);
        for plot in [
            Plot::Line(points()),
            Plot::Bar(points()),
            Plot::Scatter(points()),
            Plot::Line(vec![]),
        ] {
            let svg = renderer.render(&chart(plot)).unwrap();
            assert!(svg.contains("<svg"));
            assert!(svg.contains("</svg>"));
        }
    }

    #[test]
    fn test_render_pie_labels() {
        let renderer = SvgChartRenderer::new(640, 360);
        let wedges = vec![
            PieWedge::new("[10.00, 18.00)".to_string(), 3, 75.0),
            PieWedge::new("[18.00, 26.00]".to_string(), 1, 25.0),
            PieWedge::new("[26.00, 34.00]".to_string(), 0, 0.0),
        ];
        let data = chart(Plot::Pie(wedges));
        assert_eq!(data.selection(), ChartSelection::Pie);

        let svg = renderer.render(&data).unwrap();
        assert!(svg.contains("75.0%"));
        assert!(svg.contains("[18.00, 26.00]"));
        assert!(svg.contains("[26.00, 34.00]"));
        assert!(!svg.contains("0.0%"));
    }
}
