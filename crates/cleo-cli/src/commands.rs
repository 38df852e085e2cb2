//! Subcommand implementations, kept apart from argument parsing so they
//! can be driven from tests.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use cleo_core::CleoConfig;
use cleo_ingest::{parse_watch_history, ImportSummary, Importer};
use cleo_store::{GraphStore, StoreOptions};

/// Parse `history` and write the graph into the configured database.
pub fn import(history: &Path, config: &CleoConfig) -> anyhow::Result<ImportSummary> {
    let graph = parse_watch_history(history)
        .with_context(|| format!("Failed to read history {}", history.display()))?;

    let store = GraphStore::open_with(
        &config.db_path,
        StoreOptions {
            enforce_foreign_keys: config.enforce_foreign_keys,
        },
    )
    .with_context(|| format!("Failed to open store {}", config.db_path.display()))?;

    let summary = Importer::new(&store).import_graph(&graph)?;
    store.close()?;

    info!(
        "Import finished: {} nodes, {} edges into {}",
        summary.nodes,
        summary.edges,
        config.db_path.display()
    );
    Ok(summary)
}

/// Line printed after a successful import.
pub fn import_message(summary: &ImportSummary, db_path: &Path) -> String {
    format!(
        "Imported {} nodes and {} edges into {}.",
        summary.nodes,
        summary.edges,
        db_path.display()
    )
}

/// Render the configured database to the configured report path. Returns
/// the absolute path of the written file.
pub fn report(config: &CleoConfig) -> anyhow::Result<PathBuf> {
    let written = cleo_report::generate_html_report(&config.db_path, &config.report_path)
        .with_context(|| format!("Failed to generate report from {}", config.db_path.display()))?;
    Ok(std::fs::canonicalize(&written).unwrap_or(written))
}
