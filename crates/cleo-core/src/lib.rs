//! Cleo Core — error taxonomy and configuration shared by every crate.

pub mod config;
pub mod error;

pub use config::{CleoConfig, DEFAULT_DB_PATH, DEFAULT_REPORT_PATH};
pub use error::{Error, Result};
