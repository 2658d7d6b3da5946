//! HTML report: assembly, persistence and the end-to-end generator.

pub mod generator;
pub mod html;
pub mod store;

use thiserror::Error;

use crate::charts::ChartError;
use crate::db::{DatabaseError, TableError};

pub use generator::{generate_report, GeneratedReport, REPORT_TITLE};
pub use html::{render_report, ReportDocument};
pub use store::ReportStore;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Chart '{name}' failed: {source}")]
    Chart {
        name: String,
        #[source]
        source: ChartError,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Report file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report store lock poisoned")]
    LockPoisoned,
}
