use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Hospital Statistics API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the generated report inside the output directory.
pub const REPORT_FILE_NAME: &str = "reporte.html";

pub const DEFAULT_DB_PATH: &str = "hospital_db.sqlite";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5174", "http://localhost:3000"];

pub const ENV_DB_PATH: &str = "HOSPITAL_STATS_DB";
pub const ENV_BIND_ADDR: &str = "HOSPITAL_STATS_BIND";
pub const ENV_OUTPUT_DIR: &str = "HOSPITAL_STATS_OUTPUT_DIR";
pub const ENV_CORS_ORIGINS: &str = "HOSPITAL_STATS_CORS_ORIGINS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "hospital_stats_lib=info,hospital_stats=info,tower_http=warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("Invalid CORS origin '{0}': expected http:// or https:// origin")]
    InvalidOrigin(String),
}

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub output_dir: PathBuf,
    pub cors_origins: Vec<String>,
}

impl StatsConfig {
    /// Resolve from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for each variable. Unset variables take
    /// their defaults; set-but-invalid ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = path_var(&lookup, ENV_DB_PATH, DEFAULT_DB_PATH)?;
        let output_dir = path_var(&lookup, ENV_OUTPUT_DIR, DEFAULT_OUTPUT_DIR)?;

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        let cors_origins = match lookup(ENV_CORS_ORIGINS) {
            Some(raw) => parse_origins(&raw)?,
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            db_path,
            bind_addr,
            output_dir,
            cors_origins,
        })
    }
}

fn path_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<PathBuf, ConfigError> {
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(PathBuf::from(value.trim())),
        None => Ok(PathBuf::from(default)),
    }
}

/// Comma-separated origins. Blank entries are ignored.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect();

    if origins.is_empty() {
        return Err(ConfigError::Empty {
            var: ENV_CORS_ORIGINS,
        });
    }
    if let Some(bad) = origins
        .iter()
        .find(|o| !(o.starts_with("http://") || o.starts_with("https://")) || o.contains(char::is_whitespace))
    {
        return Err(ConfigError::InvalidOrigin(bad.clone()));
    }
    Ok(origins)
}
