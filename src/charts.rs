//! Time-series charts over the processed table.
//!
//! Each chart is described declaratively ([`ChartSpec`]) with A1 ranges into
//! the output table, then rendered to SVG from the in-memory derived rows.

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::a1_notation::column_range;
use crate::error::{AccelError, Result};
use crate::output::{COL_DISPLACEMENT, COL_ELAPSED_TIME, COL_SHIFTED, COL_VELOCITY};
use crate::types::DerivedRow;

pub const PLOT_WIDTH: u32 = 900;
pub const PLOT_HEIGHT: u32 = 500;
const FONT_SIZE_TITLE: u32 = 24;
const FONT_SIZE_LEGEND: u32 = 14;
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

const FIRST_ANCHOR_ROW: usize = 4;
const ANCHOR_COL: usize = 20;
const ANCHOR_ROW_STEP: usize = 20;

/// Quantity plotted against elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Displacement,
    Velocity,
    Acceleration,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [
        Quantity::Displacement,
        Quantity::Velocity,
        Quantity::Acceleration,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Quantity::Displacement => "d/t",
            Quantity::Velocity => "v/t",
            Quantity::Acceleration => "a/t",
        }
    }

    /// File-name friendly form of the title.
    pub fn slug(self) -> &'static str {
        match self {
            Quantity::Displacement => "d-t",
            Quantity::Velocity => "v-t",
            Quantity::Acceleration => "a-t",
        }
    }

    /// Output table column holding this quantity.
    pub fn column(self) -> usize {
        match self {
            Quantity::Displacement => COL_DISPLACEMENT,
            Quantity::Velocity => COL_VELOCITY,
            Quantity::Acceleration => COL_SHIFTED,
        }
    }

    pub fn series_label(self) -> &'static str {
        match self {
            Quantity::Displacement => "d(t)",
            Quantity::Velocity => "v(t)",
            Quantity::Acceleration => "accY-compensated-inverted-shifted",
        }
    }

    fn axis_label(self) -> &'static str {
        match self {
            Quantity::Displacement => "Displacement (m)",
            Quantity::Velocity => "Velocity (m/s)",
            Quantity::Acceleration => "Acceleration (m/s²)",
        }
    }

    fn value(self, row: &DerivedRow) -> f64 {
        match self {
            Quantity::Displacement => row.displacement,
            Quantity::Velocity => row.velocity,
            Quantity::Acceleration => row.shifted_accel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPosition {
    pub anchor_row: usize,
    pub anchor_col: usize,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Declarative line chart over the processed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub quantity: Quantity,
    pub x_range: String,
    pub y_range: String,
    pub num_headers: usize,
    pub use_first_column_as_domain: bool,
    pub legend_position: &'static str,
    pub position: ChartPosition,
}

/// The d/t, v/t and a/t charts for a table of `row_count` rows (header
/// included). Charts stack downward from row 4, column T.
pub fn insight_charts(row_count: usize) -> Vec<ChartSpec> {
    Quantity::ALL
        .iter()
        .enumerate()
        .map(|(i, &quantity)| ChartSpec {
            title: quantity.title().to_string(),
            quantity,
            x_range: column_range(COL_ELAPSED_TIME, 1, row_count),
            y_range: column_range(quantity.column(), 1, row_count),
            num_headers: 1,
            use_first_column_as_domain: true,
            legend_position: "bottom",
            position: ChartPosition {
                anchor_row: FIRST_ANCHOR_ROW + i * ANCHOR_ROW_STEP,
                anchor_col: ANCHOR_COL,
                offset_x: 0,
                offset_y: 0,
            },
        })
        .collect()
}

/// Elapsed time vs the chart's quantity, skipping non-finite points.
pub fn chart_points(spec: &ChartSpec, rows: &[DerivedRow]) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|r| (r.elapsed_time, spec.quantity.value(r)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

/// Plot range with 10% padding, or a fixed pad for flat data.
pub fn padded_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (-0.5, 0.5);
    }
    let range = max - min;
    let padding = if range < 1e-9 { 0.5 } else { range * 0.1 };
    (min - padding, max + padding)
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    points: &[(f64, f64)],
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", FONT_SIZE_TITLE).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Elapsed time (s)")
        .y_desc(spec.quantity.axis_label())
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))?
        .label(spec.quantity.series_label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_COLOR));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerMiddle)
        .label_font(("sans-serif", FONT_SIZE_LEGEND).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render one chart to an SVG file.
pub fn render_svg(spec: &ChartSpec, rows: &[DerivedRow], path: &Path) -> Result<()> {
    let points = chart_points(spec, rows);
    let root = SVGBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    draw_chart(root, spec, &points).map_err(|e| AccelError::Chart(format!("{}: {e}", spec.title)))
}

/// SVG file for one chart of `table`.
pub fn chart_file(dir: &Path, table: &str, quantity: Quantity) -> PathBuf {
    dir.join(format!("{table}-{}.svg", quantity.slug()))
}

/// Manifest written next to the charts of `table`.
pub fn manifest_file(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}-charts.json"))
}

/// A rendered chart and its layout.
#[derive(Debug, Clone, Serialize)]
pub struct ChartArtifact {
    pub file: PathBuf,
    #[serde(flatten)]
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartManifest {
    pub table: String,
    pub charts: Vec<ChartArtifact>,
}

/// Render every insight chart for `table` into `dir` and write the manifest
/// next to them.
pub fn render_all(dir: &Path, table: &str, rows: &[DerivedRow]) -> Result<ChartManifest> {
    let mut charts = Vec::new();
    for spec in insight_charts(rows.len() + 1) {
        let file = chart_file(dir, table, spec.quantity);
        render_svg(&spec, rows, &file)?;
        info!("rendered {} chart to {}", spec.title, file.display());
        charts.push(ChartArtifact { file, spec });
    }

    let manifest = ChartManifest {
        table: table.to_string(),
        charts,
    };
    std::fs::write(
        manifest_file(dir, table),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(manifest)
}
