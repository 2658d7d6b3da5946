use rusqlite::named_params;

use crate::db::{Database, DatabaseError, Table};
use crate::models::{AppointmentStatus, ReferenceTime};

use super::window_start;

/// Total appointments on record.
pub fn total(db: &Database) -> Result<i64, DatabaseError> {
    let table = db.execute_query("SELECT COUNT(*) AS total FROM appointments", [])?;
    Ok(table.scalar_i64("total")?.unwrap_or(0))
}

pub fn by_status(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            estado,
            COUNT(*) AS total
         FROM appointments
         GROUP BY estado
         ORDER BY total DESC, estado ASC",
        [],
    )
}

/// Appointments per calendar month over `[today - months, today]`, with
/// per-status sub-counts. One row per month that has appointments,
/// ascending.
pub fn monthly_trend(db: &Database, months: u32, at: &ReferenceTime) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            strftime('%Y-%m', fecha) AS mes,
            COUNT(*) AS total_citas,
            SUM(CASE WHEN estado = :attended THEN 1 ELSE 0 END) AS atendidas,
            SUM(CASE WHEN estado = :cancelled THEN 1 ELSE 0 END) AS canceladas,
            SUM(CASE WHEN estado = :pending THEN 1 ELSE 0 END) AS pendientes
         FROM appointments
         WHERE fecha >= :start AND fecha <= :today
         GROUP BY mes
         ORDER BY mes ASC",
        named_params! {
            ":attended": AppointmentStatus::Attended.as_str(),
            ":cancelled": AppointmentStatus::Cancelled.as_str(),
            ":pending": AppointmentStatus::Pending.as_str(),
            ":start": window_start(at.today, months),
            ":today": at.today,
        },
    )
}

/// Appointment count per physician specialty.
pub fn demanded_specialties(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            m.especialidad,
            COUNT(a.id) AS total_citas
         FROM appointments a
         INNER JOIN medicos m ON a.professional_identificacion = m.identificacion
         GROUP BY m.especialidad
         ORDER BY total_citas DESC, m.especialidad ASC",
        [],
    )
}

/// Appointment count per time slot, in clock order.
pub fn hourly_distribution(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            hora,
            COUNT(*) AS total_citas
         FROM appointments
         GROUP BY hora
         ORDER BY hora ASC",
        [],
    )
}

/// Time slots ranked by appointment count, with each slot's share of all
/// appointments as a percentage.
pub fn peak_hours(db: &Database) -> Result<Table, DatabaseError> {
    db.execute_query(
        "SELECT
            hora,
            COUNT(*) AS total_citas,
            ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM appointments), 2) AS porcentaje
         FROM appointments
         GROUP BY hora
         ORDER BY total_citas DESC, hora ASC",
        [],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use chrono::NaiveDate;

    fn reference() -> ReferenceTime {
        ReferenceTime::on(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())
    }

    fn seeded() -> Database {
        let db = memory_db();
        seed(&db, seed_hospital);
        db
    }

    #[test]
    fn total_and_status_breakdown() {
        let db = seeded();
        assert_eq!(total(&db).unwrap(), 7);
        let table = by_status(&db).unwrap();
        assert_eq!(table.texts("estado").unwrap(), vec!["atendida", "cancelada", "pendiente"]);
        assert_eq!(table.numbers("total").unwrap(), vec![4.0, 2.0, 1.0]);
        assert_eq!(table.sum("total").unwrap(), 7.0);
    }

    #[test]
    fn monthly_trend_groups_by_calendar_month() {
        let table = monthly_trend(&seeded(), 12, &reference()).unwrap();
        assert_eq!(table.texts("mes").unwrap(), vec!["2026-03", "2026-04", "2026-05", "2026-06"]);
        assert_eq!(table.numbers("total_citas").unwrap(), vec![1.0, 1.0, 1.0, 3.0]);
        assert_eq!(table.numbers("atendidas").unwrap(), vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(table.numbers("canceladas").unwrap(), vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(table.numbers("pendientes").unwrap(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn monthly_trend_stays_inside_window() {
        let db = seeded();
        seed(&db, |conn| {
            insert_appointment(conn, 4, "M-100", "2026-09-01", "08:00", "pendiente");
            insert_appointment(conn, 4, "M-100", "2026-04-15", "08:00", "pendiente");
            insert_appointment(conn, 4, "M-100", "2026-04-14", "08:00", "pendiente");
        });
        let at = reference();
        for months in [0, 1, 2, 6, 24] {
            let start = window_start(at.today, months).format("%Y-%m").to_string();
            let table = monthly_trend(&db, months, &at).unwrap();
            let months_seen = table.texts("mes").unwrap();
            assert!(months_seen.iter().all(|m| m.as_str() >= start.as_str() && m.as_str() <= "2026-06"));
            let mut deduped = months_seen.clone();
            deduped.dedup();
            assert_eq!(deduped, months_seen);
        }

        // Two months back from 2026-06-15 starts on 2026-04-15.
        let table = monthly_trend(&db, 2, &at).unwrap();
        assert_eq!(table.texts("mes").unwrap(), vec!["2026-04", "2026-05", "2026-06"]);
        assert_eq!(table.numbers("total_citas").unwrap(), vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn zero_month_window_is_today_only() {
        let db = seeded();
        seed(&db, |conn| insert_appointment(conn, 4, "M-100", "2026-06-15", "08:00", "pendiente"));
        let table = monthly_trend(&db, 0, &reference()).unwrap();
        assert_eq!(table.texts("mes").unwrap(), vec!["2026-06"]);
        assert_eq!(table.numbers("total_citas").unwrap(), vec![1.0]);
    }

    #[test]
    fn demanded_specialties_ranked() {
        let table = demanded_specialties(&seeded()).unwrap();
        assert_eq!(table.texts("especialidad").unwrap(), vec!["Cardiología", "Pediatría"]);
        assert_eq!(table.numbers("total_citas").unwrap(), vec![5.0, 2.0]);
    }

    #[test]
    fn hourly_distribution_in_clock_order() {
        let table = hourly_distribution(&seeded()).unwrap();
        assert_eq!(table.texts("hora").unwrap(), vec!["08:00", "09:00", "10:00", "11:00"]);
        assert_eq!(table.numbers("total_citas").unwrap(), vec![3.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn peak_hours_percentages() {
        let table = peak_hours(&seeded()).unwrap();
        assert_eq!(table.texts("hora").unwrap(), vec!["08:00", "09:00", "10:00", "11:00"]);
        assert_eq!(table.numbers("porcentaje").unwrap(), vec![42.86, 28.57, 14.29, 14.29]);
    }

    #[test]
    fn empty_store_yields_empty_tables() {
        let db = memory_db();
        assert_eq!(total(&db).unwrap(), 0);
        assert!(peak_hours(&db).unwrap().is_empty());
        assert!(monthly_trend(&db, 12, &reference()).unwrap().is_empty());
    }
}
