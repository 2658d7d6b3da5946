use rusqlite::{named_params, params};

use crate::db::{Database, DatabaseError, Table};
use crate::models::{ActivityBreakdown, AppointmentStatus, ReferenceTime, SubjectKind};

use super::{block_breakdown, window_start};

/// Total registered patients.
pub fn total_registered(db: &Database) -> Result<i64, DatabaseError> {
    let table = db.execute_query("SELECT COUNT(*) AS total FROM users", [])?;
    Ok(table.scalar_i64("total")?.unwrap_or(0))
}

/// Patients with at least one appointment dated within the last `months`
/// months (inclusive of `today`), with their appointment count in the window.
pub fn active_in_window(
    db: &Database,
    months: u32,
    at: &ReferenceTime,
) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            u.user_id,
            u.nombre,
            u.apellido,
            u.tipo_documento,
            COUNT(a.id) AS total_citas
         FROM users u
         INNER JOIN appointments a ON u.user_id = a.user_id
         WHERE a.fecha >= ?1 AND a.fecha <= ?2
         GROUP BY u.user_id, u.nombre, u.apellido, u.tipo_documento
         ORDER BY total_citas DESC, u.user_id ASC",
        params![window_start(at.today, months), at.today],
    )
}

/// Mean appointment count over patients that have any appointment.
/// 0.0 when no appointments exist.
pub fn average_appointments_per_patient(db: &Database) -> Result<f64, DatabaseError> {
    let table = db.execute_query(
        "SELECT AVG(citas_count) AS promedio
         FROM (
            SELECT user_id, COUNT(*) AS citas_count
            FROM appointments
            GROUP BY user_id
         )",
        [],
    )?;
    Ok(table.scalar_f64("promedio")?.unwrap_or(0.0))
}

/// Registered patients per document type.
pub fn document_type_distribution(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            tipo_documento,
            COUNT(*) AS cantidad
         FROM users
         GROUP BY tipo_documento
         ORDER BY cantidad DESC, tipo_documento ASC",
        [],
    )
}

pub fn block_status(db: &Database, at: &ReferenceTime) -> Result<ActivityBreakdown, DatabaseError> {
    block_breakdown(db, SubjectKind::Patient, at)
}

/// The `limit` patients with the most appointments. Patients without
/// appointments never appear.
pub fn top_by_appointments(db: &Database, limit: u32) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            u.user_id,
            u.nombre,
            u.apellido,
            u.tipo_documento,
            COUNT(a.id) AS total_citas,
            SUM(CASE WHEN a.estado = :attended THEN 1 ELSE 0 END) AS citas_atendidas,
            SUM(CASE WHEN a.estado = :cancelled THEN 1 ELSE 0 END) AS citas_canceladas
         FROM users u
         INNER JOIN appointments a ON u.user_id = a.user_id
         GROUP BY u.user_id, u.nombre, u.apellido, u.tipo_documento
         ORDER BY total_citas DESC, u.user_id ASC
         LIMIT :limit",
        named_params! {
            ":attended": AppointmentStatus::Attended.as_str(),
            ":cancelled": AppointmentStatus::Cancelled.as_str(),
            ":limit": i64::from(limit),
        },
    )
}
