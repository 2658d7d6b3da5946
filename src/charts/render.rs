//! `ChartRenderer` backed by the plotters bitmap backend.
//!
//! Each chart is drawn into an in-memory RGB buffer and then encoded to
//! PNG. Category axes use segmented coordinates so every bar owns one
//! labelled slot.

use std::io::Cursor;
use std::ops::Range;

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::palette::{self, Rgb};
use super::specs::mean_label;
use super::{Bar, Chart, ChartError, ChartKind, ChartRenderer, Series};

const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Production renderer. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, chart: &Chart) -> Result<Vec<u8>, ChartError> {
        if chart.kind.is_empty() {
            return Err(ChartError::NoData(chart.title.clone()));
        }

        let (width, height) = chart.size;
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;

            match &chart.kind {
                ChartKind::HorizontalBars { bars, value_suffix } => {
                    draw_horizontal_bars(&root, chart, bars, value_suffix)?
                }
                ChartKind::Columns { bars, mean } => draw_columns(&root, chart, bars, *mean)?,
                ChartKind::Lines { categories, series } => draw_lines(&root, chart, categories, series)?,
                ChartKind::GroupedColumns { categories, series } => {
                    draw_grouped_columns(&root, chart, categories, series)?
                }
                ChartKind::Pie { slices, legend_suffix } => draw_pie(&root, chart, slices, legend_suffix)?,
                ChartKind::Heatmap {
                    rows,
                    columns,
                    values,
                    legend,
                } => draw_heatmap(&root, chart, rows, columns, values, legend)?,
            }

            root.present().map_err(drawing)?;
        }

        tracing::debug!(title = %chart.title, width, height, "Chart rendered");
        encode_png(width, height, buffer)
    }
}

/// Encode a packed RGB8 buffer as PNG.
pub fn encode_png(width: u32, height: u32, buffer: Vec<u8>) -> Result<Vec<u8>, ChartError> {
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ChartError::Encoding("bitmap size does not match chart dimensions".into()))?;

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ChartError::Encoding(e.to_string()))?;
    Ok(cursor.into_inner())
}

// ═══════════════════════════════════════════════════════════
// Shared helpers
// ═══════════════════════════════════════════════════════════

fn drawing<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn caption_font() -> FontDesc<'static> {
    (FONT, 28).into_font()
}

fn label_font() -> FontDesc<'static> {
    (FONT, 15).into_font()
}

fn axis_font() -> FontDesc<'static> {
    (FONT, 18).into_font()
}

/// Value axis upper bound with room for the value annotations.
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Segmented range giving exactly `n` slots. A single slot still needs a
/// non-degenerate inner range.
fn slots(n: usize) -> Range<i32> {
    0..(n as i32 - 1).max(1)
}

fn slot_index(value: &SegmentValue<i32>) -> Option<usize> {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i).ok(),
        _ => None,
    }
}

/// Counts print without decimals; averages keep one.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Pixel width for a category label column.
fn label_area_width<'a>(labels: impl Iterator<Item = &'a str>) -> u32 {
    let longest = labels.map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    (longest * 8 + 20).clamp(60, 420)
}

// ═══════════════════════════════════════════════════════════
// Chart kinds
// ═══════════════════════════════════════════════════════════

fn draw_horizontal_bars(root: &Area, chart: &Chart, bars: &[Bar], suffix: &str) -> Result<(), ChartError> {
    let x_max = headroom(chart.kind.max_value());
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(label_area_width(bars.iter().map(|b| b.label.as_str())))
        .build_cartesian_2d(0f64..x_max, slots(bars.len()).into_segmented())
        .map_err(drawing)?;

    let label_of = |v: &SegmentValue<i32>| {
        slot_index(v)
            .and_then(|i| bars.get(i))
            .map(|b| b.label.clone())
            .unwrap_or_default()
    };
    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(bars.len() + 1)
        .y_label_formatter(&label_of)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .label_style(label_font())
        .axis_desc_style(axis_font())
        .draw()
        .map_err(drawing)?;

    ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (bar.value, SegmentValue::Exact(i + 1))],
            rgb(bar.color).filled(),
        );
        rect.set_margin(6, 6, 0, 0);
        rect
    }))
    .map_err(drawing)?;

    let value_style = label_font().color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center));
    ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            format!(" {}{}", format_value(bar.value), suffix),
            (bar.value, SegmentValue::CenterOf(i as i32)),
            value_style.clone(),
        )
    }))
    .map_err(drawing)?;

    Ok(())
}

fn draw_columns(root: &Area, chart: &Chart, bars: &[Bar], mean: Option<f64>) -> Result<(), ChartError> {
    let y_max = headroom(chart.kind.max_value());
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(slots(bars.len()).into_segmented(), 0f64..y_max)
        .map_err(drawing)?;

    let label_of = |v: &SegmentValue<i32>| {
        slot_index(v)
            .and_then(|i| bars.get(i))
            .map(|b| b.label.clone())
            .unwrap_or_default()
    };
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len() + 1)
        .x_label_formatter(&label_of)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .label_style(label_font())
        .axis_desc_style(axis_font())
        .draw()
        .map_err(drawing)?;

    ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
            rgb(bar.color).filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))
    .map_err(drawing)?;

    let value_style = label_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Bottom));
    ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            format_value(bar.value),
            (SegmentValue::CenterOf(i as i32), bar.value),
            value_style.clone(),
        )
    }))
    .map_err(drawing)?;

    if let Some(mean) = mean {
        // Dashed line drawn in pixel space across the plotting area.
        let (x0, y) = ctx.backend_coord(&(SegmentValue::Exact(0), mean));
        let (x1, _) = ctx.backend_coord(&(SegmentValue::Last, mean));
        let style = rgb(palette::MEAN_LINE).stroke_width(2);
        let mut x = x0;
        while x < x1 {
            root.draw(&PathElement::new(vec![(x, y), ((x + 10).min(x1), y)], style))
                .map_err(drawing)?;
            x += 16;
        }
        root.draw(&Text::new(
            mean_label(mean),
            (x1 - 160, y - 24),
            label_font().color(&rgb(palette::MEAN_LINE)),
        ))
        .map_err(drawing)?;
    }

    Ok(())
}

fn draw_lines(root: &Area, chart: &Chart, categories: &[String], series: &[Series]) -> Result<(), ChartError> {
    let y_max = headroom(chart.kind.max_value());
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(slots(categories.len()), 0f64..y_max)
        .map_err(drawing)?;

    let label_of = |x: &i32| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| categories.get(i))
            .cloned()
            .unwrap_or_default()
    };
    ctx.configure_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&label_of)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .label_style(label_font())
        .axis_desc_style(axis_font())
        .draw()
        .map_err(drawing)?;

    for s in series {
        let color = rgb(s.color);
        let points: Vec<(i32, f64)> = s
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as i32, *v))
            .collect();

        ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
            .map_err(drawing)?
            .label(s.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));

        ctx.draw_series(points.into_iter().map(|p| Circle::new(p, 5, color.filled())))
            .map_err(drawing)?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()
        .map_err(drawing)?;

    Ok(())
}

fn draw_grouped_columns(
    root: &Area,
    chart: &Chart,
    categories: &[String],
    series: &[Series],
) -> Result<(), ChartError> {
    // One slot per series plus a spacer between groups.
    let group = series.len() + 1;
    let y_max = headroom(chart.kind.max_value());
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(slots(categories.len() * group).into_segmented(), 0f64..y_max)
        .map_err(drawing)?;

    let label_of = |v: &SegmentValue<i32>| match slot_index(v) {
        Some(i) if i % group == series.len() / 2 => categories.get(i / group).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() * group + 1)
        .x_label_formatter(&label_of)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .label_style(label_font())
        .axis_desc_style(axis_font())
        .draw()
        .map_err(drawing)?;

    for (k, s) in series.iter().enumerate() {
        let color = rgb(s.color);
        ctx.draw_series(s.values.iter().enumerate().map(|(c, v)| {
            let slot = (c * group + k) as i32;
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(slot), 0.0), (SegmentValue::Exact(slot + 1), *v)],
                color.filled(),
            );
            rect.set_margin(0, 0, 1, 1);
            rect
        }))
        .map_err(drawing)?
        .label(s.name.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()
        .map_err(drawing)?;

    Ok(())
}

fn draw_pie(root: &Area, chart: &Chart, slices: &[Bar], legend_suffix: &str) -> Result<(), ChartError> {
    let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        return Err(ChartError::NoData(chart.title.clone()));
    }
    let colors: Vec<RGBColor> = slices.iter().map(|s| rgb(s.color)).collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    let area = root.titled(&chart.title, caption_font()).map_err(drawing)?;
    let (w, h) = area.dim_in_pixel();

    let center = ((f64::from(w) * 0.4) as i32, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(axis_font().color(&BLACK));
    pie.percentages(label_font().color(&WHITE));
    area.draw(&pie).map_err(drawing)?;

    let x = (f64::from(w) * 0.75) as i32;
    for (i, slice) in slices.iter().enumerate() {
        let y = 40 + i as i32 * 30;
        area.draw(&Rectangle::new([(x, y), (x + 18, y + 18)], rgb(slice.color).filled()))
            .map_err(drawing)?;
        area.draw(&Text::new(
            format!("{}: {}{}", slice.label, format_value(slice.value), legend_suffix),
            (x + 26, y),
            label_font(),
        ))
        .map_err(drawing)?;
    }

    Ok(())
}

fn draw_heatmap(
    root: &Area,
    chart: &Chart,
    rows: &[String],
    columns: &[String],
    values: &[Vec<f64>],
    legend: &str,
) -> Result<(), ChartError> {
    let max = chart.kind.max_value();
    let (w, _) = root.dim_in_pixel();
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_font())
        .margin(20)
        .margin_right(160)
        .x_label_area_size(50)
        .y_label_area_size(label_area_width(rows.iter().map(String::as_str)))
        .build_cartesian_2d(slots(columns.len()).into_segmented(), slots(rows.len()).into_segmented())
        .map_err(drawing)?;

    // First row is drawn at the top.
    let row_at = |slot: usize| rows.len().checked_sub(slot + 1).and_then(|r| rows.get(r));
    let column_label = |v: &SegmentValue<i32>| {
        slot_index(v)
            .and_then(|i| columns.get(i))
            .cloned()
            .unwrap_or_default()
    };
    let row_label = |v: &SegmentValue<i32>| slot_index(v).and_then(row_at).cloned().unwrap_or_default();

    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(columns.len() + 1)
        .y_labels(rows.len() + 1)
        .x_label_formatter(&column_label)
        .y_label_formatter(&row_label)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .label_style(label_font())
        .axis_desc_style(axis_font())
        .draw()
        .map_err(drawing)?;

    for (r, row) in values.iter().enumerate() {
        let slot = (rows.len() - 1 - r) as i32;
        for (c, value) in row.iter().enumerate() {
            let c = c as i32;
            let fill = palette::heat(*value, max);
            let mut cell = Rectangle::new(
                [(SegmentValue::Exact(c), SegmentValue::Exact(slot)), (SegmentValue::Exact(c + 1), SegmentValue::Exact(slot + 1))],
                rgb(fill).filled(),
            );
            cell.set_margin(1, 1, 1, 1);
            ctx.draw_series(std::iter::once(cell)).map_err(drawing)?;

            let text_style = label_font()
                .color(&rgb(palette::contrasting_text(fill)))
                .pos(Pos::new(HPos::Center, VPos::Center));
            ctx.draw_series(std::iter::once(Text::new(
                format!("{value:.0}"),
                (SegmentValue::CenterOf(c), SegmentValue::CenterOf(slot)),
                text_style,
            )))
            .map_err(drawing)?;
        }
    }

    // Colour scale: ten steps, high values at the top.
    let bar_x = w as i32 - 130;
    let steps = 10;
    for step in 0..steps {
        let y = 80 + step * 30;
        let t = 1.0 - f64::from(step) / f64::from(steps - 1);
        root.draw(&Rectangle::new(
            [(bar_x, y), (bar_x + 24, y + 30)],
            rgb(palette::sample(&palette::YL_OR_RD, t)).filled(),
        ))
        .map_err(drawing)?;
    }
    root.draw(&Text::new(format_value(max), (bar_x + 32, 80), label_font()))
        .map_err(drawing)?;
    root.draw(&Text::new("0", (bar_x + 32, 80 + steps * 30 - 16), label_font()))
        .map_err(drawing)?;
    root.draw(&Text::new(legend.to_string(), (bar_x - 10, 50), label_font()))
        .map_err(drawing)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::specs;
    use crate::db::{Cell, Table};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    fn int(v: i64) -> Cell {
        Cell::Integer(v)
    }

    fn assert_png(chart: Chart) {
        let png = PlottersRenderer
            .render(&chart)
            .unwrap_or_else(|e| panic!("rendering '{}' failed: {e}", chart.title));
        assert_eq!(&png[..8], PNG_SIGNATURE, "chart '{}'", chart.title);
    }

    #[test]
    fn encode_png_writes_png_signature() {
        let png = encode_png(2, 2, vec![255; 12]).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encode_png_rejects_short_buffer() {
        let err = encode_png(4, 4, vec![0; 3]).unwrap_err();
        assert!(matches!(err, ChartError::Encoding(_)));
    }

    #[test]
    fn empty_chart_is_no_data() {
        let chart = Chart {
            title: "Vacío".into(),
            x_desc: String::new(),
            y_desc: String::new(),
            size: (100, 100),
            kind: ChartKind::Columns { bars: vec![], mean: None },
        };
        assert!(matches!(PlottersRenderer.render(&chart), Err(ChartError::NoData(_))));
    }

    #[test]
    fn slots_never_degenerate() {
        assert_eq!(slots(1), 0..1);
        assert_eq!(slots(4), 0..3);
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(2.5), "2.5");
    }

    #[test]
    fn renders_horizontal_bars() {
        let t = table(
            &["especialidad", "total_citas"],
            vec![
                vec![text("Cardiología"), int(9)],
                vec![text("Pediatría"), int(2)],
                vec![text("Dermatología"), int(5)],
            ],
        );
        assert_png(specs::specialty_demand(&t).unwrap());

        let single = table(&["especialidad", "total_citas"], vec![vec![text("Pediatría"), int(1)]]);
        assert_png(specs::specialty_demand(&single).unwrap());
    }

    #[test]
    fn renders_top_physicians() {
        let t = table(
            &["nombre", "apellido", "especialidad", "total_citas"],
            vec![
                vec![text("Laura"), text("Gómez"), text("Cardiología"), int(8)],
                vec![text("Pedro"), text("Núñez"), text("Pediatría"), int(3)],
            ],
        );
        assert_png(specs::top_physicians(&t, 10).unwrap());
    }

    #[test]
    fn renders_columns_with_mean_line() {
        let t = table(
            &["hora", "total_citas"],
            vec![
                vec![text("08"), int(4)],
                vec![text("09"), int(1)],
                vec![text("14"), int(6)],
            ],
        );
        assert_png(specs::hourly_distribution(&t).unwrap());

        let single = table(&["hora", "total_citas"], vec![vec![text("10"), int(2)]]);
        assert_png(specs::hourly_distribution(&single).unwrap());
    }

    #[test]
    fn renders_trend_lines() {
        let columns = ["mes", "total_citas", "atendidas", "canceladas", "pendientes"];
        let t = table(
            &columns,
            vec![
                vec![text("2026-03"), int(5), int(3), int(1), int(1)],
                vec![text("2026-04"), int(2), int(1), int(0), int(1)],
                vec![text("2026-05"), int(7), int(4), int(2), int(1)],
            ],
        );
        assert_png(specs::monthly_trend(&t).unwrap());

        let single = table(&columns, vec![vec![text("2026-06"), int(1), int(1), int(0), int(0)]]);
        assert_png(specs::monthly_trend(&single).unwrap());
    }

    #[test]
    fn renders_pie() {
        let t = table(
            &["tipo_documento", "cantidad"],
            vec![vec![text("CC"), int(6)], vec![text("TI"), int(2)], vec![text("CE"), int(1)]],
        );
        assert_png(specs::document_types(&t).unwrap());

        let single = table(&["tipo_documento", "cantidad"], vec![vec![text("CC"), int(3)]]);
        assert_png(specs::document_types(&single).unwrap());
    }

    #[test]
    fn renders_grouped_columns() {
        let columns = ["sede_nombre", "citas_atendidas", "citas_canceladas", "citas_pendientes"];
        let t = table(
            &columns,
            vec![
                vec![text("Norte"), int(4), int(1), int(2)],
                vec![text("Sur"), int(2), int(0), int(1)],
            ],
        );
        assert_png(specs::site_comparison(&t).unwrap());

        let idle = table(
            &columns,
            vec![
                vec![text("Norte"), int(0), int(0), int(0)],
                vec![text("Centro"), int(0), int(0), int(0)],
            ],
        );
        assert_png(specs::site_comparison(&idle).unwrap());
    }

    #[test]
    fn renders_heatmap() {
        let t = table(
            &["sede_nombre", "especialidad", "total_citas"],
            vec![
                vec![text("Norte"), text("Cardiología"), int(5)],
                vec![text("Norte"), text("Pediatría"), int(2)],
                vec![text("Sur"), text("Cardiología"), int(1)],
            ],
        );
        assert_png(specs::specialty_site_heatmap(&t).unwrap());

        let single = table(
            &["sede_nombre", "especialidad", "total_citas"],
            vec![vec![text("Norte"), text("Pediatría"), int(1)]],
        );
        assert_png(specs::specialty_site_heatmap(&single).unwrap());
    }
}
