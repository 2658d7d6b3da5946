use rusqlite::named_params;

use crate::db::{Database, DatabaseError, Table};
use crate::models::{ActivityBreakdown, AppointmentStatus, AveragePeriod, ReferenceTime, SubjectKind};

use super::{block_breakdown, window_start};

/// Physicians per specialty.
pub fn count_by_specialty(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            especialidad,
            COUNT(*) AS total_medicos
         FROM medicos
         GROUP BY especialidad
         ORDER BY total_medicos DESC, especialidad ASC",
        [],
    )
}

/// Appointments per physician over the period's window, divided by the
/// number of months in it. Physicians without appointments report 0.
pub fn average_appointments(
    db: &Database,
    period: AveragePeriod,
    at: &ReferenceTime,
) -> Result<Table, DatabaseError> {
    let months = period.months();
    db.execute_query(
        "SELECT
            m.identificacion,
            m.nombre,
            m.apellido,
            m.especialidad,
            ROUND(COUNT(a.id) * 1.0 / :divisor, 2) AS promedio_citas
         FROM medicos m
         LEFT JOIN appointments a
            ON m.identificacion = a.professional_identificacion
           AND a.fecha >= :start
           AND a.fecha <= :today
         GROUP BY m.identificacion, m.nombre, m.apellido, m.especialidad
         ORDER BY promedio_citas DESC, m.identificacion ASC",
        named_params! {
            ":divisor": f64::from(months),
            ":start": window_start(at.today, months),
            ":today": at.today,
        },
    )
}

/// The `limit` physicians with the most appointments, with their site and
/// per-status counts.
pub fn most_requested(db: &Database, limit: u32) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            m.identificacion,
            m.nombre,
            m.apellido,
            m.especialidad,
            s.name AS sede_nombre,
            COUNT(a.id) AS total_citas,
            SUM(CASE WHEN a.estado = :attended THEN 1 ELSE 0 END) AS citas_atendidas,
            SUM(CASE WHEN a.estado = :cancelled THEN 1 ELSE 0 END) AS citas_canceladas
         FROM medicos m
         LEFT JOIN sedes s ON m.sede_id = s.id
         LEFT JOIN appointments a ON m.identificacion = a.professional_identificacion
         GROUP BY m.identificacion, m.nombre, m.apellido, m.especialidad, s.name
         ORDER BY total_citas DESC, m.identificacion ASC
         LIMIT :limit",
        named_params! {
            ":attended": AppointmentStatus::Attended.as_str(),
            ":cancelled": AppointmentStatus::Cancelled.as_str(),
            ":limit": i64::from(limit),
        },
    )
}

/// Share of cancelled appointments per physician, as a percentage rounded
/// to two decimals. Physicians with no appointments are left out.
pub fn cancellation_rate(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            m.identificacion,
            m.nombre,
            m.apellido,
            m.especialidad,
            COUNT(a.id) AS total_citas,
            SUM(CASE WHEN a.estado = :cancelled THEN 1 ELSE 0 END) AS citas_canceladas,
            ROUND(
                SUM(CASE WHEN a.estado = :cancelled THEN 1 ELSE 0 END) * 100.0 / COUNT(a.id),
                2
            ) AS tasa_cancelacion
         FROM medicos m
         LEFT JOIN appointments a ON m.identificacion = a.professional_identificacion
         GROUP BY m.identificacion, m.nombre, m.apellido, m.especialidad
         HAVING COUNT(a.id) > 0
         ORDER BY tasa_cancelacion DESC, m.identificacion ASC",
        named_params! { ":cancelled": AppointmentStatus::Cancelled.as_str() },
    )
}

pub fn block_status(db: &Database, at: &ReferenceTime) -> Result<ActivityBreakdown, DatabaseError> {
    block_breakdown(db, SubjectKind::Physician, at)
}

/// Total registered physicians.
pub fn total_registered(db: &Database) -> Result<i64, DatabaseError> {
    let table = db.execute_query("SELECT COUNT(*) AS total FROM medicos", [])?;
    Ok(table.scalar_i64("total")?.unwrap_or(0))
}
