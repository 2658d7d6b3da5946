//! Self-contained HTML report page.
//!
//! Everything the page needs is inlined: styles, charts as base64 PNG data
//! URIs and the table sort/filter script, so the file can be opened offline
//! or mailed as a single attachment.

use base64::Engine as _;
use chrono::NaiveDateTime;

use crate::db::{Cell, Table};

/// Inputs for one report page. Sections render in insertion order.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: NaiveDateTime,
    /// Headline figures as (label, formatted value).
    pub summary: Vec<(String, String)>,
    /// Chart caption → PNG bytes.
    pub charts: Vec<(String, Vec<u8>)>,
    /// Table caption → rows.
    pub tables: Vec<(String, Table)>,
}

/// Render the full report page.
pub fn render_report(doc: &ReportDocument) -> String {
    let title = escape_html(&doc.title);
    let generated = doc.generated_at.format("%d/%m/%Y %H:%M:%S");

    format!(
        r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
{style}
</style>
</head>
<body>
<div class="container-reporte">
  <div class="header-reporte">
    <h1>{title}</h1>
    <p class="fecha-generacion">Generado el: {generated}</p>
  </div>
  <div class="contenido-reporte">
    <section class="seccion">
      <h2 class="seccion-titulo">Resumen Ejecutivo</h2>
      <div class="estadisticas-resumen">
{summary}
      </div>
    </section>
    <section class="seccion">
      <h2 class="seccion-titulo">Visualizaciones Gráficas</h2>
{charts}
    </section>
    <section class="seccion">
      <h2 class="seccion-titulo">Datos Detallados</h2>
{tables}
    </section>
  </div>
  <div class="footer-reporte">
    <p><strong>Sistema de Estadísticas Hospitalarias</strong></p>
    <p>Reporte generado automáticamente</p>
  </div>
</div>
<script>
{script}
</script>
</body>
</html>"##,
        title = title,
        generated = generated,
        style = REPORT_STYLE,
        summary = render_summary(&doc.summary),
        charts = render_charts(&doc.charts),
        tables = render_tables(&doc.tables),
        script = TABLE_SCRIPT,
    )
}

fn render_summary(summary: &[(String, String)]) -> String {
    summary
        .iter()
        .map(|(label, value)| {
            format!(
                r#"        <div class="tarjeta-estadistica"><div class="etiqueta">{}</div><div class="valor">{}</div></div>"#,
                escape_html(label),
                escape_html(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_charts(charts: &[(String, Vec<u8>)]) -> String {
    if charts.is_empty() {
        return EMPTY_SECTION.to_string();
    }
    charts
        .iter()
        .map(|(name, png)| {
            let name = escape_html(name);
            format!(
                r#"      <div class="grafico-contenedor">
        <h3 class="grafico-titulo">{name}</h3>
        <img src="{src}" alt="{name}">
      </div>"#,
                src = png_data_uri(png),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tables(tables: &[(String, Table)]) -> String {
    if tables.is_empty() {
        return EMPTY_SECTION.to_string();
    }
    tables
        .iter()
        .enumerate()
        .map(|(idx, (name, table))| {
            format!(
                r#"      <div class="tabla-contenedor">
        <h3 class="tabla-titulo">{name}</h3>
        <input type="search" class="tabla-filtro" placeholder="Buscar..." aria-controls="table_{idx}">
{table}
      </div>"#,
                name = escape_html(name),
                table = table_to_html(table, &format!("table_{idx}")),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `table` as `<table class="data-table">` with one header per column.
pub fn table_to_html(table: &Table, id: &str) -> String {
    let mut html = format!(r#"        <table class="data-table" id="{}">"#, escape_html(id));
    html.push_str("\n          <thead><tr>");
    for column in table.columns() {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr></thead>\n          <tbody>");
    for row in table.rows() {
        html.push_str("\n            <tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell_text(cell))));
        }
        html.push_str("</tr>");
    }
    html.push_str("\n          </tbody>\n        </table>");
    html
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const EMPTY_SECTION: &str = r#"      <p class="sin-datos">No hay datos disponibles.</p>"#;

const REPORT_STYLE: &str = r#"*,*::before,*::after{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);color:#1f2937;padding:20px}
.container-reporte{max-width:1400px;margin:0 auto;background:#fff;border-radius:15px;box-shadow:0 10px 40px rgba(0,0,0,.2);overflow:hidden}
.header-reporte{background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);color:#fff;padding:40px;text-align:center}
.header-reporte h1{margin:0 0 10px;font-size:2.4rem}
.fecha-generacion{margin:0;opacity:.9}
.contenido-reporte{padding:40px}
.seccion{margin-bottom:50px}
.seccion-titulo{color:#667eea;border-bottom:3px solid #667eea;padding-bottom:10px;margin-bottom:30px}
.estadisticas-resumen{display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:20px}
.tarjeta-estadistica{background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);color:#fff;padding:25px;border-radius:10px;text-align:center}
.tarjeta-estadistica .etiqueta{font-size:.9rem;opacity:.9;text-transform:uppercase;letter-spacing:1px}
.tarjeta-estadistica .valor{font-size:2.2rem;font-weight:700;margin-top:8px}
.grafico-contenedor,.tabla-contenedor{background:#f8f9fa;border-radius:10px;padding:25px;margin-bottom:30px;box-shadow:0 2px 10px rgba(0,0,0,.08)}
.grafico-titulo,.tabla-titulo{color:#374151;margin:0 0 20px}
.grafico-contenedor img{max-width:100%;height:auto;display:block;margin:0 auto;border-radius:8px}
.tabla-filtro{display:block;margin:0 0 12px auto;padding:8px 12px;border:1px solid #d1d5db;border-radius:6px;min-width:240px}
.data-table{width:100%;border-collapse:collapse;background:#fff}
.data-table th{background:#667eea;color:#fff;padding:12px;text-align:left;cursor:pointer;user-select:none;white-space:nowrap}
.data-table th[data-order=asc]::after{content:" \25B2"}
.data-table th[data-order=desc]::after{content:" \25BC"}
.data-table td{padding:10px 12px;border-bottom:1px solid #e5e7eb}
.data-table tbody tr:hover{background:#eef2ff}
.sin-datos{color:#6b7280;font-style:italic}
.footer-reporte{background:#f8f9fa;padding:30px;text-align:center;color:#6b7280;border-top:1px solid #e5e7eb}
@media print{body{background:#fff;padding:0}.container-reporte{box-shadow:none}.tabla-filtro{display:none}}"#;

const TABLE_SCRIPT: &str = r#"(function(){
  var NUMERIC=/^-?\d+(\.\d+)?$/;
  function text(row,idx){return row.cells[idx].textContent.trim();}
  document.querySelectorAll('table.data-table').forEach(function(table){
    var tbody=table.tBodies[0];
    var filter=document.querySelector('input[aria-controls="'+table.id+'"]');
    if(filter){
      filter.addEventListener('input',function(){
        var q=filter.value.toLowerCase();
        Array.prototype.forEach.call(tbody.rows,function(row){
          row.style.display=row.textContent.toLowerCase().indexOf(q)===-1?'none':'';
        });
      });
    }
    Array.prototype.forEach.call(table.tHead.rows[0].cells,function(th,idx){
      th.addEventListener('click',function(){
        var asc=th.getAttribute('data-order')!=='asc';
        Array.prototype.forEach.call(th.parentNode.cells,function(c){c.removeAttribute('data-order');});
        th.setAttribute('data-order',asc?'asc':'desc');
        var rows=Array.prototype.slice.call(tbody.rows);
        rows.sort(function(r1,r2){
          var a=text(r1,idx),b=text(r2,idx);
          var res=NUMERIC.test(a)&&NUMERIC.test(b)?parseFloat(a)-parseFloat(b):a.localeCompare(b,'es');
          return asc?res:-res;
        });
        rows.forEach(function(r){tbody.appendChild(r);});
      });
    });
  });
})();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 15)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["nombre".into(), "tasa_cancelacion".into()]);
        table.push_row(vec![Cell::Text("Laura".into()), Cell::Real(25.0)]);
        table.push_row(vec![Cell::Text("<b>Andrés</b>".into()), Cell::Null]);
        table
    }

    fn document() -> ReportDocument {
        ReportDocument {
            title: "Reporte de Estadísticas Hospitalarias".into(),
            generated_at: generated_at(),
            summary: vec![
                ("Total Pacientes".into(), "4".into()),
                ("Promedio Citas/Paciente".into(), "2.33".into()),
            ],
            charts: vec![("Citas por Especialidad".into(), vec![0x89, b'P', b'N', b'G'])],
            tables: vec![("Médicos - Métricas Completas".into(), sample_table())],
        }
    }

    #[test]
    fn page_contains_every_section() {
        let html = render_report(&document());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="es">"#));
        assert!(html.contains("<title>Reporte de Estadísticas Hospitalarias</title>"));
        assert!(html.contains("Generado el: 15/06/2026 09:05:07"));
        assert!(html.contains(r#"<div class="etiqueta">Total Pacientes</div><div class="valor">4</div>"#));
        assert!(html.contains(r#"<h3 class="grafico-titulo">Citas por Especialidad</h3>"#));
        assert!(html.contains(r#"<h3 class="tabla-titulo">Médicos - Métricas Completas</h3>"#));
        assert!(html.contains(r#"<table class="data-table" id="table_0">"#));
        assert!(html.contains("<th>tasa_cancelacion</th>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn charts_are_inlined_as_base64() {
        let html = render_report(&document());
        assert!(html.contains(r#"src="data:image/png;base64,iVBORw==""#));
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn cell_text_is_escaped() {
        let html = render_report(&document());
        assert!(html.contains("<td>&lt;b&gt;Andrés&lt;/b&gt;</td><td>-</td>"));
        assert!(!html.contains("<b>Andrés</b>"));
    }

    #[test]
    fn empty_sections_show_placeholder() {
        let doc = ReportDocument {
            charts: vec![],
            tables: vec![],
            ..document()
        };
        let html = render_report(&doc);
        assert_eq!(html.matches("No hay datos disponibles.").count(), 2);
    }

    #[test]
    fn escape_covers_attribute_quotes() {
        assert_eq!(escape_html(r#"a "b" & 'c'"#), "a &quot;b&quot; &amp; &#39;c&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn table_rows_follow_query_order() {
        let html = table_to_html(&sample_table(), "t");
        let laura = html.find("Laura").unwrap();
        let andres = html.find("Andrés").unwrap();
        assert!(laura < andres);
        assert_eq!(html.matches("<tr>").count(), 3);
    }
}
