//! Database validation — checks schema and referential integrity of a graph
//! database without modifying it.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use cleo_store::schema::REQUIRED_TABLES;
use cleo_store::{GraphStats, GraphStore, GraphView};

const NODE_COLUMNS: [&str; 4] = ["id", "type", "label", "properties"];
const EDGE_COLUMNS: [&str; 6] = ["id", "source_id", "target_id", "type", "weight", "properties"];

/// Result of validating a graph database.
#[derive(Debug)]
pub struct ValidationReport {
    pub db_valid: bool,
    pub nodes: i64,
    pub edges: i64,
    pub dangling_edges: i64,
    pub stats: Option<GraphStats>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            db_valid: false,
            nodes: 0,
            edges: 0,
            dangling_edges: 0,
            stats: None,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Valid schema and every edge endpoint present.
    pub fn is_healthy(&self) -> bool {
        self.db_valid && self.errors.is_empty() && self.dangling_edges == 0
    }
}

/// Validate the graph database at `db_path`.
pub fn validate(db_path: &Path) -> ValidationReport {
    let mut report = ValidationReport::new();

    if !db_path.exists() {
        report
            .errors
            .push(format!("Database not found: {}", db_path.display()));
        return report;
    }

    let conn = match Connection::open_with_flags(db_path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
    {
        Ok(c) => c,
        Err(e) => {
            report.errors.push(format!("Failed to open database: {}", e));
            return report;
        }
    };

    for table in REQUIRED_TABLES {
        match table_exists(&conn, table) {
            Ok(true) => {}
            Ok(false) => report.errors.push(format!("Missing required table: {}", table)),
            Err(e) => report
                .errors
                .push(format!("Error checking table {}: {}", table, e)),
        }
    }
    if !report.errors.is_empty() {
        return report;
    }

    check_columns(&conn, "nodes", &NODE_COLUMNS, &mut report.errors);
    check_columns(&conn, "edges", &EDGE_COLUMNS, &mut report.errors);
    if !report.errors.is_empty() {
        return report;
    }

    report.db_valid = true;
    report.nodes = count(&conn, "SELECT COUNT(*) FROM nodes").unwrap_or(0);
    report.edges = count(&conn, "SELECT COUNT(*) FROM edges").unwrap_or(0);

    match count(
        &conn,
        "SELECT COUNT(*) FROM edges \
         WHERE source_id NOT IN (SELECT id FROM nodes) \
            OR target_id NOT IN (SELECT id FROM nodes)",
    ) {
        Ok(dangling) => {
            report.dangling_edges = dangling;
            if dangling > 0 {
                report
                    .warnings
                    .push(format!("{} edges reference missing nodes", dangling));
            }
        }
        Err(e) => report
            .warnings
            .push(format!("Cannot check edge endpoints: {}", e)),
    }

    for table in REQUIRED_TABLES {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE json_valid(properties) = 0", table);
        if let Ok(invalid) = count(&conn, &sql) {
            if invalid > 0 {
                report
                    .errors
                    .push(format!("{} rows in {} have invalid properties JSON", invalid, table));
            }
        }
    }
    drop(conn);

    if report.errors.is_empty() {
        match load_stats(db_path) {
            Ok(stats) => report.stats = Some(stats),
            Err(e) => report.warnings.push(format!("Cannot load graph: {}", e)),
        }
    }

    debug!("Validated {}: {:?}", db_path.display(), report);
    report
}

fn load_stats(db_path: &Path) -> cleo_core::Result<GraphStats> {
    let store = GraphStore::open(db_path)?;
    let view = GraphView::from_parts(store.fetch_nodes()?, store.fetch_edges()?);
    store.close()?;
    Ok(view.stats())
}

/// Print a human-readable validation report to stdout.
pub fn print_report(report: &ValidationReport) {
    println!("=== Cleo Graph Validation Report ===");
    println!();
    println!("Database valid:     {}", if report.db_valid { "YES" } else { "NO" });
    println!("Nodes:              {}", report.nodes);
    println!("Edges:              {}", report.edges);
    println!("Dangling edges:     {}", report.dangling_edges);

    if let Some(stats) = &report.stats {
        println!();
        println!("Nodes by type:");
        for (node_type, count) in &stats.nodes_by_type {
            println!("  {:<18}{}", node_type, count);
        }
        println!("Edges by type:");
        for (edge_type, count) in &stats.edges_by_type {
            println!("  {:<18}{}", edge_type, count);
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {}", w);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  - {}", e);
        }
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn check_columns(conn: &Connection, table: &str, required: &[&str], errors: &mut Vec<String>) {
    let columns = get_column_names(conn, table);
    for col in required {
        if !columns.iter().any(|c| c == col) {
            errors.push(format!("{} table missing column: {}", table, col));
        }
    }
}

fn get_column_names(conn: &Connection, table: &str) -> Vec<String> {
    // Table names come from the constants above, never from input.
    let query = format!("PRAGMA table_info({})", table);
    let mut names = Vec::new();
    if let Ok(mut stmt) = conn.prepare(&query) {
        if let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(1)) {
            for name in rows.flatten() {
                names.push(name);
            }
        }
    }
    names
}

fn count(conn: &Connection, sql: &str) -> Result<i64, rusqlite::Error> {
    conn.query_row(sql, [], |row| row.get(0))
}
