pub mod connection;
pub mod sqlite;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use connection::*;
pub use sqlite::*;
pub use table::{Cell, Table, TableError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection is not open")]
    NotConnected,

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error(transparent)]
    Table(#[from] TableError),
}
