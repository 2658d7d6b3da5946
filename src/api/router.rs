//! Statistics API router.
//!
//! Returns a composable `Router`: the banner at `/`, everything else
//! nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Request logger

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the statistics API router.
///
/// `cors_origins` lists the browser origins allowed to call the API.
pub fn stats_api_router(core: Arc<CoreState>, cors_origins: &[String]) -> Router {
    let ctx = ApiContext::new(core);

    let api = Router::new()
        .route("/estadisticas", get(endpoints::statistics::overview))
        .route("/estadisticas/pacientes", get(endpoints::statistics::patients))
        .route("/estadisticas/medicos", get(endpoints::statistics::physicians))
        .route("/estadisticas/sedes", get(endpoints::statistics::sites))
        .route("/estadisticas/citas", get(endpoints::statistics::appointments))
        .route("/reporte/generar", post(endpoints::report::generate))
        .route("/reporte/descargar", get(endpoints::report::download))
        .route("/health", get(endpoints::health::check));

    Router::new()
        .route("/", get(endpoints::root::banner))
        .nest("/api", api)
        .with_state(ctx)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::logging::log_request))
        .layer(cors_layer(cors_origins))
}

/// CORS for the configured origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
