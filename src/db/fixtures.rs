//! Seed helpers for tests that need a populated hospital database.

use rusqlite::{params, Connection};

use super::{open_memory_database, Database};

pub fn memory_db() -> Database {
    Database::from_connection(open_memory_database().expect("open_memory_database"))
}

/// Run `f` with direct write access to the test database.
pub fn seed(db: &Database, f: impl FnOnce(&Connection)) {
    db.with_connection(|conn| {
        f(conn);
        Ok(())
    })
    .expect("seed database");
}

pub fn insert_site(conn: &Connection, id: i64, name: &str, address: &str) {
    conn.execute(
        "INSERT INTO sedes (id, name, address) VALUES (?1, ?2, ?3)",
        params![id, name, address],
    )
    .unwrap();
}

pub fn insert_patient(conn: &Connection, id: i64, nombre: &str, apellido: &str, tipo_documento: &str) {
    conn.execute(
        "INSERT INTO users (user_id, nombre, apellido, tipo_documento) VALUES (?1, ?2, ?3, ?4)",
        params![id, nombre, apellido, tipo_documento],
    )
    .unwrap();
}

pub fn insert_physician(
    conn: &Connection,
    identificacion: &str,
    nombre: &str,
    apellido: &str,
    especialidad: &str,
    sede_id: Option<i64>,
) {
    conn.execute(
        "INSERT INTO medicos (identificacion, nombre, apellido, especialidad, sede_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![identificacion, nombre, apellido, especialidad, sede_id],
    )
    .unwrap();
}

pub fn insert_appointment(
    conn: &Connection,
    user_id: i64,
    physician: &str,
    fecha: &str,
    hora: &str,
    estado: &str,
) {
    conn.execute(
        "INSERT INTO appointments (user_id, professional_identificacion, fecha, hora, estado)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, physician, fecha, hora, estado],
    )
    .unwrap();
}

pub fn insert_block(
    conn: &Connection,
    user_identifier: &str,
    user_type: &str,
    is_active: bool,
    blocked_until: Option<&str>,
) {
    conn.execute(
        "INSERT INTO user_blocks (user_identifier, user_type, is_active, blocked_until)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_identifier, user_type, is_active, blocked_until],
    )
    .unwrap();
}

/// Two sites, three physicians, four patients and a spread of appointments
/// across statuses, hours and months (reference day: 2026-06-15).
pub fn seed_hospital(conn: &Connection) {
    insert_site(conn, 1, "Sede Norte", "Calle 100 #15-20");
    insert_site(conn, 2, "Sede Sur", "Avenida 1 #2-30");

    insert_physician(conn, "M-100", "Laura", "Gómez", "Cardiología", Some(1));
    insert_physician(conn, "M-200", "Andrés", "Rojas", "Pediatría", Some(1));
    insert_physician(conn, "M-300", "Sofía", "Vargas", "Cardiología", Some(2));

    insert_patient(conn, 1, "Ana", "Ruiz", "CC");
    insert_patient(conn, 2, "Carlos", "Mejía", "CC");
    insert_patient(conn, 3, "Valentina", "Torres", "TI");
    insert_patient(conn, 4, "Jorge", "Díaz", "CE");

    // Patient 1: four appointments
    insert_appointment(conn, 1, "M-100", "2026-06-10", "08:00", "atendida");
    insert_appointment(conn, 1, "M-100", "2026-05-03", "09:00", "atendida");
    insert_appointment(conn, 1, "M-200", "2026-04-20", "08:00", "cancelada");
    insert_appointment(conn, 1, "M-300", "2025-01-15", "10:00", "atendida");
    // Patient 2: two appointments
    insert_appointment(conn, 2, "M-100", "2026-06-01", "08:00", "pendiente");
    insert_appointment(conn, 2, "M-100", "2026-03-11", "11:00", "cancelada");
    // Patient 3: one appointment
    insert_appointment(conn, 3, "M-200", "2026-06-12", "09:00", "atendida");
    // Patient 4: none
}
