//! Fixed visual mapping from aggregation tables to chart descriptions.
//!
//! Each builder reads the named columns it needs and fails with
//! `ChartError::Table` when one is missing, or `ChartError::NoData` on an
//! empty table.

use std::collections::BTreeSet;

use crate::db::Table;

use super::palette::{self, Rgb};
use super::{Bar, Chart, ChartError, ChartKind, Series};

const APPOINTMENTS_AXIS: &str = "Número de Citas";
const TOTAL_AXIS: &str = "Total de Citas";

fn require_rows(table: &Table, title: &str) -> Result<(), ChartError> {
    if table.is_empty() {
        return Err(ChartError::NoData(title.to_string()));
    }
    Ok(())
}

/// Pair labels with values and sort ascending by value (stable), so the
/// largest bar ends up on top of a horizontal bar chart.
fn ascending(labels: Vec<String>, values: Vec<f64>) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = labels.into_iter().zip(values).collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    pairs
}

fn colored(pairs: Vec<(String, f64)>, colors: Vec<Rgb>) -> Vec<Bar> {
    pairs
        .into_iter()
        .zip(colors)
        .map(|((label, value), color)| Bar { label, value, color })
        .collect()
}

/// Horizontal bars of appointments per specialty (`especialidad`, `total_citas`).
pub fn specialty_demand(table: &Table) -> Result<Chart, ChartError> {
    let title = "Distribución de Citas por Especialidad Médica";
    require_rows(table, title)?;

    let pairs = ascending(table.texts("especialidad")?, table.numbers("total_citas")?);
    let colors = palette::gradient(&palette::VIRIDIS, pairs.len());

    Ok(Chart {
        title: title.to_string(),
        x_desc: TOTAL_AXIS.to_string(),
        y_desc: "Especialidad".to_string(),
        size: (1200, 600),
        kind: ChartKind::HorizontalBars {
            bars: colored(pairs, colors),
            value_suffix: String::new(),
        },
    })
}

/// Monthly trend lines: total plus one line per status.
pub fn monthly_trend(table: &Table) -> Result<Chart, ChartError> {
    let title = "Evolución Temporal de Citas por Estado";
    require_rows(table, title)?;

    let series = [
        ("Total", "total_citas", palette::TOTAL),
        ("Atendidas", "atendidas", palette::ATTENDED),
        ("Canceladas", "canceladas", palette::CANCELLED),
        ("Pendientes", "pendientes", palette::PENDING),
    ]
    .into_iter()
    .map(|(name, column, color)| -> Result<Series, ChartError> {
        Ok(Series {
            name: name.to_string(),
            values: table.numbers(column)?,
            color,
        })
    })
    .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(Chart {
        title: title.to_string(),
        x_desc: "Mes".to_string(),
        y_desc: APPOINTMENTS_AXIS.to_string(),
        size: (1400, 700),
        kind: ChartKind::Lines {
            categories: table.texts("mes")?,
            series,
        },
    })
}

/// "Dr(a). <nombre> <apellido> (<especialidad>)"
pub fn physician_label(nombre: &str, apellido: &str, especialidad: &str) -> String {
    format!("Dr(a). {nombre} {apellido} ({especialidad})")
}

/// Horizontal bars for the first `top_n` rows of the most-requested ranking.
pub fn top_physicians(table: &Table, top_n: usize) -> Result<Chart, ChartError> {
    let title = format!("Top {top_n} Médicos Más Solicitados");
    require_rows(table, &title)?;

    let nombres = table.texts("nombre")?;
    let apellidos = table.texts("apellido")?;
    let especialidades = table.texts("especialidad")?;
    let labels: Vec<String> = nombres
        .iter()
        .zip(&apellidos)
        .zip(&especialidades)
        .take(top_n)
        .map(|((n, a), e)| physician_label(n, a, e))
        .collect();

    let mut totals = table.numbers("total_citas")?;
    totals.truncate(top_n);

    let pairs = ascending(labels, totals);
    let colors = palette::gradient(&palette::ROCKET, pairs.len());

    Ok(Chart {
        title,
        x_desc: TOTAL_AXIS.to_string(),
        y_desc: "Médico".to_string(),
        size: (1200, 800),
        kind: ChartKind::HorizontalBars {
            bars: colored(pairs, colors),
            value_suffix: " citas".to_string(),
        },
    })
}

/// Columns per time slot in clock order, coloured above/below the mean,
/// with the mean drawn as a reference line.
pub fn hourly_distribution(table: &Table) -> Result<Chart, ChartError> {
    let title = "Distribución de Citas por Hora del Día";
    require_rows(table, title)?;

    let mut pairs: Vec<(String, f64)> = table
        .texts("hora")?
        .into_iter()
        .zip(table.numbers("total_citas")?)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mean = pairs.iter().map(|(_, v)| v).sum::<f64>() / pairs.len() as f64;
    let bars = pairs
        .into_iter()
        .map(|(label, value)| Bar {
            label,
            value,
            color: if value > mean {
                palette::ABOVE_MEAN
            } else {
                palette::AT_OR_BELOW_MEAN
            },
        })
        .collect();

    Ok(Chart {
        title: title.to_string(),
        x_desc: "Hora del Día".to_string(),
        y_desc: APPOINTMENTS_AXIS.to_string(),
        size: (1400, 600),
        kind: ChartKind::Columns {
            bars,
            mean: Some(mean),
        },
    })
}

/// Legend label for the hourly mean line.
pub fn mean_label(mean: f64) -> String {
    format!("Promedio: {mean:.1}")
}

/// Pie of registered patients per document type (`tipo_documento`, `cantidad`).
pub fn document_types(table: &Table) -> Result<Chart, ChartError> {
    let title = "Distribución de Pacientes por Tipo de Documento";
    require_rows(table, title)?;

    let pairs: Vec<(String, f64)> = table
        .texts("tipo_documento")?
        .into_iter()
        .zip(table.numbers("cantidad")?)
        .collect();
    let colors = palette::qualitative(pairs.len());

    Ok(Chart {
        title: title.to_string(),
        x_desc: String::new(),
        y_desc: String::new(),
        size: (1000, 800),
        kind: ChartKind::Pie {
            slices: colored(pairs, colors),
            legend_suffix: " pacientes".to_string(),
        },
    })
}

/// Grouped columns of per-status appointment counts for every site.
pub fn site_comparison(table: &Table) -> Result<Chart, ChartError> {
    let title = "Comparativa de Citas por Sede y Estado";
    require_rows(table, title)?;

    let series = [
        ("Atendidas", "citas_atendidas", palette::ATTENDED),
        ("Canceladas", "citas_canceladas", palette::CANCELLED),
        ("Pendientes", "citas_pendientes", palette::PENDING),
    ]
    .into_iter()
    .map(|(name, column, color)| -> Result<Series, ChartError> {
        Ok(Series {
            name: name.to_string(),
            values: table.numbers(column)?,
            color,
        })
    })
    .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(Chart {
        title: title.to_string(),
        x_desc: "Sede".to_string(),
        y_desc: APPOINTMENTS_AXIS.to_string(),
        size: (1400, 700),
        kind: ChartKind::GroupedColumns {
            categories: table.texts("sede_nombre")?,
            series,
        },
    })
}

/// Specialty × site pivot of appointment counts. Row and column labels are
/// sorted; pairs absent from the table are 0.
pub fn specialty_site_heatmap(table: &Table) -> Result<Chart, ChartError> {
    let title = "Demanda de Especialidades por Sede (Heatmap)";
    require_rows(table, title)?;

    let sites = table.texts("sede_nombre")?;
    let specialties = table.texts("especialidad")?;
    let totals = table.numbers("total_citas")?;

    let rows: Vec<String> = specialties.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let columns: Vec<String> = sites.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();

    let mut values = vec![vec![0.0; columns.len()]; rows.len()];
    for ((site, specialty), total) in sites.iter().zip(&specialties).zip(totals) {
        let r = rows.binary_search(specialty);
        let c = columns.binary_search(site);
        if let (Ok(r), Ok(c)) = (r, c) {
            values[r][c] += total;
        }
    }

    Ok(Chart {
        title: title.to_string(),
        x_desc: "Sede".to_string(),
        y_desc: "Especialidad".to_string(),
        size: (1200, 800),
        kind: ChartKind::Heatmap {
            rows,
            columns,
            values,
            legend: TOTAL_AXIS.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Cell, TableError};

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

    fn bars(chart: &Chart) -> &[Bar] {
        match &chart.kind {
            ChartKind::HorizontalBars { bars, .. } | ChartKind::Columns { bars, .. } => bars,
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn specialty_bars_sorted_ascending() {
        let t = table(
            &["especialidad", "total_citas"],
            vec![
                vec![text("Cardiología"), Cell::Integer(9)],
                vec![text("Pediatría"), Cell::Integer(2)],
                vec![text("Dermatología"), Cell::Integer(5)],
            ],
        );
        let chart = specialty_demand(&t).unwrap();
        let labels: Vec<&str> = bars(&chart).iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Pediatría", "Dermatología", "Cardiología"]);
        assert_eq!(bars(&chart)[0].color, palette::VIRIDIS[0]);
        assert_eq!(bars(&chart)[2].color, palette::VIRIDIS[4]);
    }

    #[test]
    fn empty_table_is_no_data() {
        let t = table(&["especialidad", "total_citas"], vec![]);
        assert!(matches!(specialty_demand(&t), Err(ChartError::NoData(_))));
    }

    #[test]
    fn missing_column_is_table_error() {
        let t = table(&["especialidad"], vec![vec![text("Cardiología")]]);
        let err = specialty_demand(&t).unwrap_err();
        assert!(matches!(
            err,
            ChartError::Table(TableError::MissingColumn(ref c)) if c == "total_citas"
        ));
    }

    #[test]
    fn physician_labels_and_top_n() {
        let t = table(
            &["nombre", "apellido", "especialidad", "total_citas"],
            vec![
                vec![text("Laura"), text("Gómez"), text("Cardiología"), Cell::Integer(8)],
                vec![text("Andrés"), text("Rojas"), text("Pediatría"), Cell::Integer(4)],
                vec![text("Sofía"), text("Vargas"), text("Cardiología"), Cell::Integer(1)],
            ],
        );
        let chart = top_physicians(&t, 2).unwrap();
        assert_eq!(chart.title, "Top 2 Médicos Más Solicitados");
        let b = bars(&chart);
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].label, "Dr(a). Andrés Rojas (Pediatría)");
        assert_eq!(b[1].label, "Dr(a). Laura Gómez (Cardiología)");
        assert_eq!(b[1].value, 8.0);
    }

    #[test]
    fn hourly_colors_split_on_mean() {
        let t = table(
            &["hora", "total_citas"],
            vec![
                vec![text("10:00"), Cell::Integer(1)],
                vec![text("08:00"), Cell::Integer(5)],
                vec![text("09:00"), Cell::Integer(3)],
            ],
        );
        let chart = hourly_distribution(&t).unwrap();
        let ChartKind::Columns { bars, mean } = &chart.kind else {
            panic!("expected columns");
        };
        assert_eq!(*mean, Some(3.0));
        let hours: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(hours, vec!["08:00", "09:00", "10:00"]);
        assert_eq!(bars[0].color, palette::ABOVE_MEAN);
        assert_eq!(bars[1].color, palette::AT_OR_BELOW_MEAN);
        assert_eq!(mean_label(3.0), "Promedio: 3.0");
    }

    #[test]
    fn trend_has_four_series() {
        let t = table(
            &["mes", "total_citas", "atendidas", "canceladas", "pendientes"],
            vec![
                vec![text("2026-05"), Cell::Integer(3), Cell::Integer(1), Cell::Integer(1), Cell::Integer(1)],
                vec![text("2026-06"), Cell::Integer(2), Cell::Integer(2), Cell::Integer(0), Cell::Null],
            ],
        );
        let chart = monthly_trend(&t).unwrap();
        let ChartKind::Lines { categories, series } = &chart.kind else {
            panic!("expected lines");
        };
        assert_eq!(categories, &vec!["2026-05".to_string(), "2026-06".to_string()]);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Total", "Atendidas", "Canceladas", "Pendientes"]);
        assert_eq!(series[3].values, vec![1.0, 0.0]);
    }

    #[test]
    fn heatmap_pivot_fills_missing_pairs_with_zero() {
        let t = table(
            &["sede_nombre", "especialidad", "total_citas"],
            vec![
                vec![text("Sede Norte"), text("Cardiología"), Cell::Integer(4)],
                vec![text("Sede Norte"), text("Pediatría"), Cell::Integer(2)],
                vec![text("Sede Sur"), text("Cardiología"), Cell::Integer(1)],
            ],
        );
        let chart = specialty_site_heatmap(&t).unwrap();
        let ChartKind::Heatmap { rows, columns, values, .. } = &chart.kind else {
            panic!("expected heatmap");
        };
        assert_eq!(rows, &vec!["Cardiología".to_string(), "Pediatría".to_string()]);
        assert_eq!(columns, &vec!["Sede Norte".to_string(), "Sede Sur".to_string()]);
        assert_eq!(values, &vec![vec![4.0, 1.0], vec![2.0, 0.0]]);
    }

    #[test]
    fn pie_and_grouped_builders() {
        let docs = table(
            &["tipo_documento", "cantidad"],
            vec![vec![text("CC"), Cell::Integer(2)], vec![text("TI"), Cell::Integer(1)]],
        );
        let chart = document_types(&docs).unwrap();
        assert!(matches!(&chart.kind, ChartKind::Pie { slices, .. } if slices.len() == 2));

        let sites = table(
            &["sede_nombre", "citas_atendidas", "citas_canceladas", "citas_pendientes"],
            vec![vec![text("Sede Norte"), Cell::Integer(3), Cell::Integer(2), Cell::Integer(1)]],
        );
        let chart = site_comparison(&sites).unwrap();
        let ChartKind::GroupedColumns { categories, series } = &chart.kind else {
            panic!("expected grouped columns");
        };
        assert_eq!(categories.len(), 1);
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].values, vec![2.0]);
    }
}
