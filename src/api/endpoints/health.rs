//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: NaiveDateTime,
}

#[derive(Serialize)]
pub struct UnhealthyResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub error: String,
}

/// `GET /api/health`: runs the liveness query against the datastore.
///
/// Answers 503 with `status: "unhealthy"` when the query fails.
pub async fn check(State(ctx): State<ApiContext>) -> Response {
    let core = Arc::clone(&ctx.core);
    let probe = tokio::task::spawn_blocking(move || core.db().ping().map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(e.to_string()));

    match probe {
        Ok(()) => Json(HealthResponse {
            status: "healthy",
            database: "connected",
            timestamp: ctx.core.reference_time().now,
        })
        .into_response(),
        Err(error) => {
            tracing::warn!(%error, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error,
                }),
            )
                .into_response()
        }
    }
}
