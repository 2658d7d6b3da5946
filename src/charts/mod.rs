//! Chart rendering for the HTML report.
//!
//! `specs` turns aggregation tables into renderer-agnostic `Chart`
//! descriptions (the fixed visual mapping per statistic). A
//! `ChartRenderer` turns a description into PNG bytes; `PlottersRenderer`
//! is the production implementation. Keeping the two apart lets report
//! generation run against a stub renderer where no fonts are installed.

pub mod palette;
pub mod render;
pub mod specs;

use thiserror::Error;

use crate::db::TableError;

pub use palette::Rgb;
pub use render::PlottersRenderer;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No data to chart: {0}")]
    NoData(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Chart drawing failed: {0}")]
    Drawing(String),

    #[error("PNG encoding failed: {0}")]
    Encoding(String),
}

/// Turns a chart description into an encoded image.
pub trait ChartRenderer: Send + Sync {
    /// Render `chart` to PNG bytes.
    fn render(&self, chart: &Chart) -> Result<Vec<u8>, ChartError>;
}

/// A single chart: caption, axis descriptions, pixel size and data.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub size: (u32, u32),
    pub kind: ChartKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// One bar per category, laid out bottom to top in the given order.
    /// Each bar is annotated with its value followed by `value_suffix`.
    HorizontalBars { bars: Vec<Bar>, value_suffix: String },
    /// Vertical bars with an optional dashed reference line at `mean`.
    Columns { bars: Vec<Bar>, mean: Option<f64> },
    /// One line per series over shared categories.
    Lines { categories: Vec<String>, series: Vec<Series> },
    /// Side-by-side bars per category, one per series.
    GroupedColumns { categories: Vec<String>, series: Vec<Series> },
    /// Share of the whole per slice, annotated with percentages.
    /// `legend_suffix` follows each slice count in the legend.
    Pie { slices: Vec<Bar>, legend_suffix: String },
    /// `values[row][column]`, colour-scaled and annotated.
    Heatmap {
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
        legend: String,
    },
}

impl ChartKind {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartKind::HorizontalBars { bars, .. } | ChartKind::Columns { bars, .. } => bars.is_empty(),
            ChartKind::Pie { slices, .. } => slices.is_empty(),
            ChartKind::Lines { categories, series } | ChartKind::GroupedColumns { categories, series } => {
                categories.is_empty() || series.is_empty()
            }
            ChartKind::Heatmap { rows, columns, .. } => rows.is_empty() || columns.is_empty(),
        }
    }

    /// Largest plotted value, used to scale the value axis.
    pub fn max_value(&self) -> f64 {
        match self {
            ChartKind::HorizontalBars { bars, .. }
            | ChartKind::Columns { bars, .. }
            | ChartKind::Pie { slices: bars, .. } => max_of(bars.iter().map(|b| b.value)),
            ChartKind::Lines { series, .. } | ChartKind::GroupedColumns { series, .. } => {
                max_of(series.iter().flat_map(|s| s.values.iter().copied()))
            }
            ChartKind::Heatmap { values, .. } => max_of(values.iter().flatten().copied()),
        }
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0_f64, f64::max)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Rgb,
}
