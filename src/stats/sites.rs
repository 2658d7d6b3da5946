use rusqlite::named_params;

use crate::db::{Database, DatabaseError, Table};
use crate::models::AppointmentStatus;

/// Appointment volume per site, attributed through the physician's site.
/// Every site is listed, including those with no appointments.
pub fn appointments_by_site(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            s.id,
            s.name AS sede_nombre,
            s.address AS direccion,
            COUNT(a.id) AS total_citas,
            SUM(CASE WHEN a.estado = :attended THEN 1 ELSE 0 END) AS citas_atendidas,
            SUM(CASE WHEN a.estado = :cancelled THEN 1 ELSE 0 END) AS citas_canceladas,
            SUM(CASE WHEN a.estado = :pending THEN 1 ELSE 0 END) AS citas_pendientes
         FROM sedes s
         LEFT JOIN medicos m ON s.id = m.sede_id
         LEFT JOIN appointments a ON m.identificacion = a.professional_identificacion
         GROUP BY s.id, s.name, s.address
         ORDER BY total_citas DESC, s.id ASC",
        named_params! {
            ":attended": AppointmentStatus::Attended.as_str(),
            ":cancelled": AppointmentStatus::Cancelled.as_str(),
            ":pending": AppointmentStatus::Pending.as_str(),
        },
    )
}

/// Appointments per (site, specialty) pair. Pairs without appointments are
/// left out.
pub fn specialties_by_site(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            s.name AS sede_nombre,
            m.especialidad,
            COUNT(a.id) AS total_citas
         FROM sedes s
         LEFT JOIN medicos m ON s.id = m.sede_id
         LEFT JOIN appointments a ON m.identificacion = a.professional_identificacion
         GROUP BY s.name, m.especialidad
         HAVING COUNT(a.id) > 0
         ORDER BY s.name ASC, total_citas DESC, m.especialidad ASC",
        [],
    )
}

/// Number of registered sites.
pub fn total_sites(db: &Database) -> Result<i64, DatabaseError> {
    let table = db.execute_query("SELECT COUNT(*) AS total FROM sedes", [])?;
    Ok(table.scalar_i64("total")?.unwrap_or(0))
}
