//! Report endpoints.
//!
//! - `POST /api/reporte/generar`: aggregate, chart and write the report
//! - `GET /api/reporte/descargar`: latest report as an HTML attachment

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ReportGenerated};
use crate::report::{self, store::download_filename};

pub const DOWNLOAD_URL: &str = "/api/reporte/descargar";

pub async fn generate(State(ctx): State<ApiContext>) -> Result<Json<ReportGenerated>, ApiError> {
    let generated = run_blocking(&ctx, |core| {
        Ok(report::generate_report(
            core.db(),
            core.renderer(),
            core.reports(),
            &core.reference_time(),
        )?)
    })
    .await?;

    Ok(Json(ReportGenerated {
        success: true,
        message: "Reporte generado exitosamente".to_string(),
        file_path: generated.path.display().to_string(),
        download_url: DOWNLOAD_URL.to_string(),
    }))
}

pub async fn download(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    let latest = run_blocking(&ctx, |core| Ok(core.reports().read_latest()?)).await?;
    let bytes = latest
        .ok_or_else(|| ApiError::NotFound("Reporte no encontrado. Genera uno primero.".into()))?;

    let filename = download_filename(ctx.core.reference_time().now);
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
