//! The single on-disk report file.
//!
//! Each generation replaces `<output_dir>/reporte.html`. Writes go to a
//! temp file in the same directory which is then renamed over the target,
//! so readers see either the previous report or the new one, never a
//! partial file. A mutex serializes concurrent generations.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;

use super::ReportError;
use crate::config::REPORT_FILE_NAME;

const TEMP_PREFIX: &str = ".reporte-";
const TEMP_SUFFIX: &str = ".tmp";

pub struct ReportStore {
    dir: PathBuf,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ReportStore {
    /// Use `dir` for the report, creating it if needed and removing temp
    /// files left behind by an interrupted write.
    pub fn open(dir: &Path) -> Result<Self, ReportError> {
        fs::create_dir_all(dir)?;
        let cleaned = cleanup_orphaned_temp_files(dir);
        if cleaned > 0 {
            tracing::info!(files_cleaned = cleaned, "Cleaned orphaned report temp files");
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            path: dir.join(REPORT_FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the report with `html`.
    pub fn write(&self, html: &str) -> Result<PathBuf, ReportError> {
        let _guard = self.write_lock.lock().map_err(|_| ReportError::LockPoisoned)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)?;
        tmp.write_all(html.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::info!(path = %self.path.display(), bytes = html.len(), "Report written");
        Ok(self.path.clone())
    }

    /// Contents of the latest report, `None` if none has been generated.
    pub fn read_latest(&self) -> Result<Option<Vec<u8>>, ReportError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Name offered to the browser when the report is downloaded.
pub fn download_filename(at: NaiveDateTime) -> String {
    format!("reporte_hospital_{}.html", at.format("%Y%m%d_%H%M%S"))
}

/// Remove leftover temp files from `dir`. Returns how many were removed.
fn cleanup_orphaned_temp_files(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return 0,
    };

    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(TEMP_PREFIX) && n.ends_with(TEMP_SUFFIX));
        if !is_temp || !path.is_file() {
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("Failed to remove report temp file: {e}");
        } else {
            count += 1;
        }
    }
    count
}
