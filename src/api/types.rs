//! Shared types for the statistics API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::AveragePeriod;
use crate::stats::{DEFAULT_ACTIVE_WINDOW_MONTHS, DEFAULT_TOP_LIMIT, DEFAULT_TREND_WINDOW_MONTHS};

/// Largest accepted `limit` for ranking endpoints.
pub const MAX_LIMIT: u32 = 100;
/// Longest accepted lookback window, in months.
pub const MAX_MONTHS: u32 = 120;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Query parameters
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    pub meses: Option<u32>,
    pub limit: Option<u32>,
}

impl PatientQuery {
    /// Validated (months, limit), with defaults for absent values.
    pub fn resolve(&self) -> Result<(u32, u32), ApiError> {
        Ok((
            months(self.meses, DEFAULT_ACTIVE_WINDOW_MONTHS)?,
            limit(self.limit)?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PhysicianQuery {
    pub limit: Option<u32>,
    pub periodo: Option<String>,
}

impl PhysicianQuery {
    pub fn resolve(&self) -> Result<(u32, AveragePeriod), ApiError> {
        let period = match self.periodo.as_deref() {
            None => AveragePeriod::default(),
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::BadRequest(format!(
                    "periodo must be '{}' or '{}', got '{raw}'",
                    AveragePeriod::Monthly,
                    AveragePeriod::Yearly
                ))
            })?,
        };
        Ok((limit(self.limit)?, period))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub meses: Option<u32>,
}

impl AppointmentQuery {
    pub fn resolve(&self) -> Result<u32, ApiError> {
        months(self.meses, DEFAULT_TREND_WINDOW_MONTHS)
    }
}

fn limit(value: Option<u32>) -> Result<u32, ApiError> {
    match value {
        None => Ok(DEFAULT_TOP_LIMIT),
        Some(v) if (1..=MAX_LIMIT).contains(&v) => Ok(v),
        Some(v) => Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {v}"
        ))),
    }
}

fn months(value: Option<u32>, default: u32) -> Result<u32, ApiError> {
    match value {
        None => Ok(default),
        Some(v) if v <= MAX_MONTHS => Ok(v),
        Some(v) => Err(ApiError::BadRequest(format!(
            "meses must be at most {MAX_MONTHS}, got {v}"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

/// Outcome of `POST /api/reporte/generar`.
#[derive(Debug, Serialize)]
pub struct ReportGenerated {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub download_url: String,
}
