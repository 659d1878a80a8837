//! Runtime configuration
//!
//! Data lives in `$XDG_DATA_HOME/qomoboro/` (~/.local/share/qomoboro/)
//! unless `QOMOBORO_DATA_DIR` points elsewhere.

use std::ffi::OsString;
use std::path::PathBuf;

pub const APP_NAME: &str = "qomoboro";

const DATA_DIR_ENV: &str = "QOMOBORO_DATA_DIR";
const LOG_LEVEL_ENV: &str = "QOMOBORO_LOG";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = match non_empty(std::env::var_os(DATA_DIR_ENV)) {
            Some(dir) => PathBuf::from(dir),
            None => data_dir_from(std::env::var_os("XDG_DATA_HOME"), home_dir()),
        };
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self { data_dir, log_level }
    }
}

/// Best-effort home directory: `$HOME`, then the platform lookup, then `.`.
fn home_dir() -> PathBuf {
    non_empty(std::env::var_os("HOME"))
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn non_empty(v: Option<OsString>) -> Option<OsString> {
    v.filter(|s| !s.is_empty())
}

// $XDG_DATA_HOME/<app> if set, else <home>/.local/share/<app>
pub fn data_dir_from(xdg_data_home: Option<OsString>, home: PathBuf) -> PathBuf {
    match non_empty(xdg_data_home) {
        Some(xdg) => PathBuf::from(xdg).join(APP_NAME),
        None => home.join(".local/share").join(APP_NAME),
    }
}
