//! End-to-end report generation: aggregate, chart, assemble, persist.

use std::path::PathBuf;

use crate::charts::{specs, Chart, ChartError, ChartRenderer};
use crate::db::{Database, Table};
use crate::models::ReferenceTime;
use crate::stats::{appointments, patients, physicians, sites, DEFAULT_TOP_LIMIT, DEFAULT_TREND_WINDOW_MONTHS};

use super::{render_report, ReportDocument, ReportError, ReportStore};

pub const REPORT_TITLE: &str = "Reporte de Estadísticas Hospitalarias";

type ChartBuilder = fn(&Table) -> Result<Chart, ChartError>;

/// Outcome of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub charts: usize,
    pub tables: usize,
}

/// Run every aggregation the report needs, render its charts with
/// `renderer`, and replace the stored report.
///
/// Charts whose source table is empty are left out. Any query, drawing or
/// write failure aborts the generation and the previous report stays in place.
pub fn generate_report(
    db: &Database,
    renderer: &dyn ChartRenderer,
    store: &ReportStore,
    at: &ReferenceTime,
) -> Result<GeneratedReport, ReportError> {
    tracing::info!("Generating hospital report");

    let specialties = appointments::demanded_specialties(db)?;
    let trend = appointments::monthly_trend(db, DEFAULT_TREND_WINDOW_MONTHS, at)?;
    let top_physicians = physicians::most_requested(db, DEFAULT_TOP_LIMIT)?;
    let hours = appointments::hourly_distribution(db)?;
    let document_types = patients::document_type_distribution(db)?;
    let by_site = sites::appointments_by_site(db)?;
    let specialties_by_site = sites::specialties_by_site(db)?;
    let physician_metrics = physicians::cancellation_rate(db)?;

    let sections: [(&str, &Table, ChartBuilder); 7] = [
        ("Citas por Especialidad", &specialties, specs::specialty_demand),
        ("Evolución Temporal de Citas", &trend, specs::monthly_trend),
        ("Top 10 Médicos Más Solicitados", &top_physicians, |t| {
            specs::top_physicians(t, DEFAULT_TOP_LIMIT as usize)
        }),
        ("Distribución de Citas por Hora", &hours, specs::hourly_distribution),
        (
            "Distribución de Pacientes por Tipo de Documento",
            &document_types,
            specs::document_types,
        ),
        ("Comparativa de Sedes", &by_site, specs::site_comparison),
        (
            "Heatmap de Especialidades por Sede",
            &specialties_by_site,
            specs::specialty_site_heatmap,
        ),
    ];

    let mut charts = Vec::with_capacity(sections.len());
    for (name, table, build) in sections {
        if table.is_empty() {
            tracing::debug!(chart = name, "Skipping chart with no data");
            continue;
        }
        charts.push((name.to_string(), render_chart(renderer, name, build(table))?));
    }

    let summary = summary(db, &by_site)?;
    let tables = vec![("Médicos - Métricas Completas".to_string(), physician_metrics)];

    let doc = ReportDocument {
        title: REPORT_TITLE.to_string(),
        generated_at: at.now,
        summary,
        charts,
        tables,
    };
    let html = render_report(&doc);
    let path = store.write(&html)?;

    tracing::info!(
        charts = doc.charts.len(),
        tables = doc.tables.len(),
        "Hospital report generated"
    );

    Ok(GeneratedReport {
        path,
        charts: doc.charts.len(),
        tables: doc.tables.len(),
    })
}

fn render_chart(
    renderer: &dyn ChartRenderer,
    name: &str,
    chart: Result<Chart, ChartError>,
) -> Result<Vec<u8>, ReportError> {
    let wrap = |source| ReportError::Chart {
        name: name.to_string(),
        source,
    };
    let chart = chart.map_err(wrap)?;
    let png = renderer.render(&chart).map_err(wrap)?;
    tracing::debug!(chart = name, bytes = png.len(), "Chart rendered");
    Ok(png)
}

/// Headline figures shown as cards at the top of the report.
fn summary(db: &Database, by_site: &Table) -> Result<Vec<(String, String)>, ReportError> {
    let total_appointments = appointments::by_status(db)?.sum("total")?;
    let average = patients::average_appointments_per_patient(db)?;

    Ok(vec![
        ("Total Pacientes".to_string(), patients::total_registered(db)?.to_string()),
        ("Total Médicos".to_string(), physicians::total_registered(db)?.to_string()),
        ("Total Citas".to_string(), format!("{}", total_appointments as i64)),
        ("Promedio Citas/Paciente".to_string(), format!("{average:.2}")),
        ("Sedes Activas".to_string(), by_site.len().to_string()),
    ])
}
