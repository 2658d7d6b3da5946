//! Serializable bundles of aggregations, one per API payload.
//!
//! Field names are the wire keys consumed by the dashboard front-end.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::{Database, DatabaseError, Table};
use crate::models::{ActivityBreakdown, AveragePeriod, ReferenceTime};

use super::{
    appointments, patients, physicians, round2, sites, DEFAULT_ACTIVE_WINDOW_MONTHS,
    DEFAULT_TOP_LIMIT, DEFAULT_TREND_WINDOW_MONTHS,
};

// ═══════════════════════════════════════════════════════════
// Full snapshot
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct StatisticsSnapshot {
    pub pacientes: PatientSummary,
    pub medicos: PhysicianSummary,
    pub sedes: SiteStats,
    pub citas: AppointmentSummary,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct PatientSummary {
    pub total: i64,
    /// Number of patients with an appointment in the default active window.
    pub activos: usize,
    pub promedio_citas: f64,
    pub distribucion_documento: Table,
    pub bloqueados: i64,
    pub activos_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PhysicianSummary {
    pub por_especialidad: Table,
    pub top_10: Table,
    pub tasa_cancelacion: Table,
    pub distribucion_horarios: Table,
    pub bloqueados: i64,
    pub activos: i64,
}

#[derive(Debug, Serialize)]
pub struct AppointmentSummary {
    pub por_estado: Table,
    pub tendencia_mensual: Table,
    pub especialidades_demandadas: Table,
    pub horarios_pico: Table,
}

/// Every subject area with default windows and limits.
pub fn full_snapshot(db: &Database, at: &ReferenceTime) -> Result<StatisticsSnapshot, DatabaseError> {
    let patient_blocks = patients::block_status(db, at)?;
    let physician_blocks = physicians::block_status(db, at)?;

    let pacientes = PatientSummary {
        total: patients::total_registered(db)?,
        activos: patients::active_in_window(db, DEFAULT_ACTIVE_WINDOW_MONTHS, at)?.len(),
        promedio_citas: round2(patients::average_appointments_per_patient(db)?),
        distribucion_documento: patients::document_type_distribution(db)?,
        bloqueados: patient_blocks.bloqueados,
        activos_count: patient_blocks.activos,
    };

    let medicos = PhysicianSummary {
        por_especialidad: physicians::count_by_specialty(db)?,
        top_10: physicians::most_requested(db, DEFAULT_TOP_LIMIT)?,
        tasa_cancelacion: physicians::cancellation_rate(db)?,
        distribucion_horarios: appointments::hourly_distribution(db)?,
        bloqueados: physician_blocks.bloqueados,
        activos: physician_blocks.activos,
    };

    let citas = AppointmentSummary {
        por_estado: appointments::by_status(db)?,
        tendencia_mensual: appointments::monthly_trend(db, DEFAULT_TREND_WINDOW_MONTHS, at)?,
        especialidades_demandadas: appointments::demanded_specialties(db)?,
        horarios_pico: appointments::peak_hours(db)?,
    };

    Ok(StatisticsSnapshot {
        pacientes,
        medicos,
        sedes: site_stats(db)?,
        citas,
        timestamp: at.now,
    })
}

// ═══════════════════════════════════════════════════════════
// Per-subject payloads
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct PatientStats {
    pub total: i64,
    pub meses: u32,
    pub activos: Table,
    pub promedio_citas: f64,
    pub distribucion_documento: Table,
    pub bloqueados_vs_activos: ActivityBreakdown,
    pub limit: u32,
    pub top_mas_citas: Table,
}

pub fn patient_stats(
    db: &Database,
    months: u32,
    limit: u32,
    at: &ReferenceTime,
) -> Result<PatientStats, DatabaseError> {
    Ok(PatientStats {
        total: patients::total_registered(db)?,
        meses: months,
        activos: patients::active_in_window(db, months, at)?,
        promedio_citas: round2(patients::average_appointments_per_patient(db)?),
        distribucion_documento: patients::document_type_distribution(db)?,
        bloqueados_vs_activos: patients::block_status(db, at)?,
        limit,
        top_mas_citas: patients::top_by_appointments(db, limit)?,
    })
}

#[derive(Debug, Serialize)]
pub struct PhysicianStats {
    pub por_especialidad: Table,
    pub periodo: AveragePeriod,
    pub promedio_citas: Table,
    pub limit: u32,
    pub mas_solicitados: Table,
    pub tasa_cancelacion: Table,
    pub distribucion_horarios: Table,
    pub bloqueados_vs_activos: ActivityBreakdown,
}

pub fn physician_stats(
    db: &Database,
    limit: u32,
    period: AveragePeriod,
    at: &ReferenceTime,
) -> Result<PhysicianStats, DatabaseError> {
    Ok(PhysicianStats {
        por_especialidad: physicians::count_by_specialty(db)?,
        periodo: period,
        promedio_citas: physicians::average_appointments(db, period, at)?,
        limit,
        mas_solicitados: physicians::most_requested(db, limit)?,
        tasa_cancelacion: physicians::cancellation_rate(db)?,
        distribucion_horarios: appointments::hourly_distribution(db)?,
        bloqueados_vs_activos: physicians::block_status(db, at)?,
    })
}

#[derive(Debug, Serialize)]
pub struct SiteStats {
    pub citas_por_sede: Table,
    pub especialidades_por_sede: Table,
}

pub fn site_stats(db: &Database) -> Result<SiteStats, DatabaseError> {
    Ok(SiteStats {
        citas_por_sede: sites::appointments_by_site(db)?,
        especialidades_por_sede: sites::specialties_by_site(db)?,
    })
}

#[derive(Debug, Serialize)]
pub struct AppointmentStats {
    pub por_estado: Table,
    pub meses: u32,
    pub tendencia_mensual: Table,
    pub especialidades_demandadas: Table,
    pub horarios_pico: Table,
}

pub fn appointment_stats(
    db: &Database,
    months: u32,
    at: &ReferenceTime,
) -> Result<AppointmentStats, DatabaseError> {
    Ok(AppointmentStats {
        por_estado: appointments::by_status(db)?,
        meses: months,
        tendencia_mensual: appointments::monthly_trend(db, months, at)?,
        especialidades_demandadas: appointments::demanded_specialties(db)?,
        horarios_pico: appointments::peak_hours(db)?,
    })
}
