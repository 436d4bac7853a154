use std::path::PathBuf;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::info;

use crate::errors::ChartError;

/// One named line of a line chart.
pub struct Line<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
    pub dashed: bool,
}

pub struct LineChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// One label per sample, shown on the x axis
    pub x_ticks: &'a [String],
    pub lines: Vec<Line<'a>>,
}

pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub categories: &'a [String],
    pub values: &'a [f64],
}

/// Where charts end up.
pub trait ChartSink {
    fn line_chart(&mut self, chart: &LineChart<'_>) -> Result<(), ChartError>;
    fn bar_chart(&mut self, chart: &BarChart<'_>) -> Result<(), ChartError>;
}

/// Renders charts to an SVG file.
pub struct SvgChart {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgChart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), size: (1024, 640) }
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Upper bound of the y axis with some headroom; never zero so an all-zero series still draws.
fn y_ceiling<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let max = values.copied().filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

impl ChartSink for SvgChart {
    fn line_chart(&mut self, chart: &LineChart<'_>) -> Result<(), ChartError> {
        let n = chart.x_ticks.len();
        if n == 0 || chart.lines.is_empty() {
            return Err(ChartError::Empty);
        }

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let y_max = y_ceiling(chart.lines.iter().flat_map(|l| l.values.iter()));
        let x_max = (n.max(2) - 1) as f64;
        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(render_err)?;

        let x_fmt = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                chart.x_ticks.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        ctx.configure_mesh()
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .x_labels(n.min(13))
            .x_label_formatter(&x_fmt)
            .draw()
            .map_err(render_err)?;

        for (i, line) in chart.lines.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<(f64, f64)> = line.values.iter().enumerate().map(|(x, y)| (x as f64, *y)).collect();
            let series = if line.dashed {
                ctx.draw_series(DashedLineSeries::new(points, 8, 6, color.stroke_width(2)))
            } else {
                ctx.draw_series(LineSeries::new(points, color.stroke_width(2)))
            };
            series
                .map_err(render_err)?
                .label(line.name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!(path = %self.path.display(), "line chart saved");
        Ok(())
    }

    fn bar_chart(&mut self, chart: &BarChart<'_>) -> Result<(), ChartError> {
        let n = chart.values.len();
        if n == 0 {
            return Err(ChartError::Empty);
        }

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let y_max = y_ceiling(chart.values.iter());
        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d((0u32..n as u32).into_segmented(), 0f64..y_max)
            .map_err(render_err)?;

        let x_fmt = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                chart.categories.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .x_label_formatter(&x_fmt)
            .draw()
            .map_err(render_err)?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(BLUE.mix(0.7).filled())
                .margin(6)
                .data(chart.values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )
        .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!(path = %self.path.display(), "bar chart saved");
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Chart sink that keeps what it was asked to draw.
    #[derive(Default)]
    pub struct RecordingChart {
        pub line_titles: Vec<String>,
        pub lines: Vec<Vec<(String, Vec<f64>, bool)>>,
        pub bar_titles: Vec<String>,
        pub bars: Vec<(Vec<String>, Vec<f64>)>,
    }

    impl ChartSink for RecordingChart {
        fn line_chart(&mut self, chart: &LineChart<'_>) -> Result<(), ChartError> {
            self.line_titles.push(chart.title.to_string());
            self.lines.push(
                chart.lines.iter().map(|l| (l.name.to_string(), l.values.to_vec(), l.dashed)).collect(),
            );
            Ok(())
        }

        fn bar_chart(&mut self, chart: &BarChart<'_>) -> Result<(), ChartError> {
            self.bar_titles.push(chart.title.to_string());
            self.bars.push((chart.categories.to_vec(), chart.values.to_vec()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.svg");
        let ticks: Vec<String> = (0..24).map(|h| format!("{h:02}:00")).collect();
        let dc: Vec<f64> = (0..24).map(|h| if (7..17).contains(&h) { 100.0 * h as f64 } else { 0.0 }).collect();
        let ac: Vec<f64> = dc.iter().map(|p| p * 0.9).collect();

        SvgChart::new(&path)
            .line_chart(&LineChart {
                title: "Simulated Inverter Output",
                x_label: "Time",
                y_label: "Power (W)",
                x_ticks: &ticks,
                lines: vec![
                    Line { name: "dc_power", values: &dc, dashed: true },
                    Line { name: "ac_power", values: &ac, dashed: false },
                ],
            })
            .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Simulated Inverter Output"));
    }

    #[test]
    fn all_zero_series_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zeros.svg");
        let ticks = vec!["a".to_string(), "b".to_string()];
        let zeros = [0.0, 0.0];
        SvgChart::new(&path)
            .line_chart(&LineChart {
                title: "zeros",
                x_label: "x",
                y_label: "y",
                x_ticks: &ticks,
                lines: vec![Line { name: "z", values: &zeros, dashed: false }],
            })
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn bar_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.svg");
        let months: Vec<String> = (1..=12).map(|m| m.to_string()).collect();
        let energy: Vec<f64> = (1..=12).map(|m| 150.0 + 20.0 * m as f64).collect();

        SvgChart::new(&path)
            .bar_chart(&BarChart {
                title: "PV Energy Production for (42.676, 23.368)",
                x_label: "Month",
                y_label: "Energy (kWh)",
                categories: &months,
                values: &energy,
            })
            .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("Energy (kWh)"));
    }

    #[test]
    fn empty_bar_chart_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SvgChart::new(dir.path().join("none.svg"))
            .bar_chart(&BarChart { title: "t", x_label: "x", y_label: "y", categories: &[], values: &[] })
            .unwrap_err();
        assert!(matches!(err, ChartError::Empty));
    }
}
