//! Service banner.

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

use crate::config::{APP_NAME, APP_VERSION};

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// `GET /`: name, version and a map of the available endpoints.
pub async fn banner() -> Json<RootResponse> {
    let endpoints = BTreeMap::from([
        ("estadisticas", "/api/estadisticas"),
        ("pacientes", "/api/estadisticas/pacientes"),
        ("medicos", "/api/estadisticas/medicos"),
        ("sedes", "/api/estadisticas/sedes"),
        ("citas", "/api/estadisticas/citas"),
        ("generar_reporte", "/api/reporte/generar"),
        ("descargar_reporte", "/api/reporte/descargar"),
        ("health", "/api/health"),
    ]);

    Json(RootResponse {
        message: APP_NAME,
        version: APP_VERSION,
        endpoints,
    })
}
