//! Cleo Ingest — watch-history parsing and graph import.

pub mod history;
pub mod ingest;
pub mod normalize;

pub use history::{parse_entries, parse_str, parse_watch_history, read_entries, ParsedGraph};
pub use ingest::{ImportSummary, Importer};
pub use normalize::{normalize_timestamp, slugify};
