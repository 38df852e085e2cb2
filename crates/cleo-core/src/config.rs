//! Configuration: database and report locations, storage options.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Database file used when neither a flag nor `CLEO_DB_PATH` is given.
pub const DEFAULT_DB_PATH: &str = "cleo_graph.db";

/// Report file used when neither a flag nor `CLEO_REPORT_PATH` is given.
pub const DEFAULT_REPORT_PATH: &str = "graph_report.html";

/// Top-level Cleo configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleoConfig {
    /// SQLite database holding the graph.
    pub db_path: PathBuf,
    /// HTML report destination.
    pub report_path: PathBuf,
    /// Turn on SQLite foreign key enforcement for `edges`.
    pub enforce_foreign_keys: bool,
}

impl Default for CleoConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            enforce_foreign_keys: false,
        }
    }
}

impl CleoConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CleoConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let db_path = lookup("CLEO_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let report_path = lookup("CLEO_REPORT_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.report_path);

        let enforce_foreign_keys = match lookup("CLEO_ENFORCE_FOREIGN_KEYS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!("CLEO_ENFORCE_FOREIGN_KEYS: invalid boolean {:?}", raw))
            })?,
            None => defaults.enforce_foreign_keys,
        };

        Ok(Self {
            db_path,
            report_path,
            enforce_foreign_keys,
        })
    }

    /// Replace the database path when a command-line value is present.
    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }

    /// Replace the report path when a command-line value is present.
    pub fn with_report_path(mut self, report_path: Option<PathBuf>) -> Self {
        if let Some(path) = report_path {
            self.report_path = path;
        }
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
