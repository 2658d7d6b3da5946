//! Connection manager for the hospital datastore.
//!
//! One handle, created at service start and closed at shutdown, passed
//! explicitly to every aggregation. Query failures are returned as
//! `DatabaseError` so callers can tell "no rows" apart from "query failed".

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, Params};

use super::{open_database, Cell, DatabaseError, Table};

pub struct Database {
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Open the datastore at `path` and verify it answers a trivial query.
    ///
    /// Failure here is fatal to startup.
    pub fn connect(path: &Path) -> Result<Self, DatabaseError> {
        let conn = open_database(path)?;
        let db = Self::from_connection(conn);
        db.ping()?;
        tracing::info!(path = %path.display(), "Connected to hospital database");
        Ok(db)
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Run a parameterized read query and materialize every row.
    pub fn execute_query<P: Params>(&self, sql: &str, params: P) -> Result<Table, DatabaseError> {
        self.with_connection(|conn| query_table(conn, sql, params))
            .inspect_err(|e| tracing::warn!(error = %e, "Query failed"))
    }

    /// Liveness probe used by startup and the health endpoint.
    pub fn ping(&self) -> Result<(), DatabaseError> {
        self.execute_query("SELECT 1 AS test", [])?;
        Ok(())
    }

    /// Borrow the open connection for the duration of `f`.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let guard = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(DatabaseError::NotConnected)?;
        f(conn)
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Close the connection. Later queries fail with `NotConnected`.
    /// Safe to call more than once.
    pub fn close(&self) {
        match self.conn.lock() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    tracing::info!("Database connection closed");
                }
            }
            Err(_) => tracing::error!("Database lock poisoned during close"),
        }
    }
}

/// Execute `sql` on `conn` and collect the result as a `Table`.
pub fn query_table<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Table, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut table = Table::new(columns);

    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(Cell::from(row.get_ref(idx)?));
        }
        table.push_row(cells);
    }

    Ok(table)
}
