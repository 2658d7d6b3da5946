//! Statistics endpoints.
//!
//! - `GET /api/estadisticas`: every subject area with default windows
//! - `GET /api/estadisticas/pacientes?meses=&limit=`
//! - `GET /api/estadisticas/medicos?limit=&periodo=`
//! - `GET /api/estadisticas/sedes`
//! - `GET /api/estadisticas/citas?meses=`

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use super::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{AppointmentQuery, ApiContext, PatientQuery, PhysicianQuery};
use crate::stats::snapshot::{
    self, AppointmentStats, PatientStats, PhysicianStats, SiteStats, StatisticsSnapshot,
};

pub async fn overview(State(ctx): State<ApiContext>) -> Result<Json<StatisticsSnapshot>, ApiError> {
    let stats = run_blocking(&ctx, |core| {
        Ok(snapshot::full_snapshot(core.db(), &core.reference_time())?)
    })
    .await?;
    Ok(Json(stats))
}

pub async fn patients(
    State(ctx): State<ApiContext>,
    query: Result<Query<PatientQuery>, QueryRejection>,
) -> Result<Json<PatientStats>, ApiError> {
    let Query(query) = query?;
    let (months, limit) = query.resolve()?;

    let stats = run_blocking(&ctx, move |core| {
        Ok(snapshot::patient_stats(core.db(), months, limit, &core.reference_time())?)
    })
    .await?;
    Ok(Json(stats))
}

pub async fn physicians(
    State(ctx): State<ApiContext>,
    query: Result<Query<PhysicianQuery>, QueryRejection>,
) -> Result<Json<PhysicianStats>, ApiError> {
    let Query(query) = query?;
    let (limit, period) = query.resolve()?;

    let stats = run_blocking(&ctx, move |core| {
        Ok(snapshot::physician_stats(core.db(), limit, period, &core.reference_time())?)
    })
    .await?;
    Ok(Json(stats))
}

pub async fn sites(State(ctx): State<ApiContext>) -> Result<Json<SiteStats>, ApiError> {
    let stats = run_blocking(&ctx, |core| Ok(snapshot::site_stats(core.db())?)).await?;
    Ok(Json(stats))
}

pub async fn appointments(
    State(ctx): State<ApiContext>,
    query: Result<Query<AppointmentQuery>, QueryRejection>,
) -> Result<Json<AppointmentStats>, ApiError> {
    let Query(query) = query?;
    let months = query.resolve()?;

    let stats = run_blocking(&ctx, move |core| {
        Ok(snapshot::appointment_stats(core.db(), months, &core.reference_time())?)
    })
    .await?;
    Ok(Json(stats))
}
