//! Shared service state.
//!
//! `CoreState` owns the long-lived resources every request needs: the
//! database handle, the chart renderer and the report store. It is built
//! once at startup, wrapped in `Arc`, and handed to the router.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::charts::{ChartRenderer, PlottersRenderer};
use crate::config::StatsConfig;
use crate::db::{Database, DatabaseError};
use crate::models::ReferenceTime;
use crate::report::{ReportError, ReportStore};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database unavailable: {0}")]
    Database(#[from] DatabaseError),

    #[error("Report store unavailable: {0}")]
    Report(#[from] ReportError),
}

pub struct CoreState {
    db: Database,
    renderer: Arc<dyn ChartRenderer>,
    reports: ReportStore,
    /// When set, every request is evaluated at this instant instead of the
    /// local clock.
    fixed_time: Option<ReferenceTime>,
}

impl CoreState {
    pub fn new(db: Database, renderer: Arc<dyn ChartRenderer>, reports: ReportStore) -> Self {
        Self {
            db,
            renderer,
            reports,
            fixed_time: None,
        }
    }

    /// Connect to the configured datastore and prepare the output directory.
    pub fn from_config(config: &StatsConfig) -> Result<Self, CoreError> {
        let db = Database::connect(&config.db_path)?;
        let reports = ReportStore::open(&config.output_dir)?;
        Ok(Self::new(db, Arc::new(PlottersRenderer), reports))
    }

    /// Pin the reference time, for deterministic responses.
    pub fn with_fixed_time(mut self, at: ReferenceTime) -> Self {
        self.fixed_time = Some(at);
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn renderer(&self) -> &dyn ChartRenderer {
        self.renderer.as_ref()
    }

    pub fn reports(&self) -> &ReportStore {
        &self.reports
    }

    pub fn report_path(&self) -> &Path {
        self.reports.path()
    }

    /// The instant aggregations should be evaluated against.
    pub fn reference_time(&self) -> ReferenceTime {
        self.fixed_time.unwrap_or_else(ReferenceTime::current)
    }

    /// Release the database connection. Called once the server has stopped.
    pub fn shutdown(&self) {
        self.db.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::memory_db;
    use chrono::NaiveDate;

    #[test]
    fn fixed_time_overrides_clock() {
        let dir = tempfile::tempdir().unwrap();
        let at = ReferenceTime::on(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap());
        let state = CoreState::new(
            memory_db(),
            Arc::new(PlottersRenderer),
            ReportStore::open(dir.path()).unwrap(),
        )
        .with_fixed_time(at);

        assert_eq!(state.reference_time(), at);
        assert_eq!(state.report_path(), dir.path().join("reporte.html"));
    }

    #[test]
    fn shutdown_closes_database() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(
            memory_db(),
            Arc::new(PlottersRenderer),
            ReportStore::open(dir.path()).unwrap(),
        );
        assert!(state.db().ping().is_ok());

        state.shutdown();
        assert!(!state.db().is_open());
        assert!(matches!(state.db().ping(), Err(DatabaseError::NotConnected)));
    }

    #[test]
    fn from_config_fails_on_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = StatsConfig {
            db_path: dir.path().join("missing.sqlite"),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            output_dir: dir.path().join("output"),
            cors_origins: vec![],
        };
        assert!(matches!(
            CoreState::from_config(&config),
            Err(CoreError::Database(_))
        ));
    }
}
