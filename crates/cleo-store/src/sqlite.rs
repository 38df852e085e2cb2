//! SQLite-backed graph store.
//!
//! Nodes are upserted by id, edges are appended. Batch calls run inside a
//! single transaction so a failed batch leaves no partial state behind.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, Transaction};
use tracing::{debug, info};

use crate::schema::{
    INSERT_EDGE_SQL, SCHEMA_SQL, SELECT_EDGES_SQL, SELECT_NODES_SQL, UPSERT_NODE_SQL,
};
use crate::types::*;
use cleo_core::{Error, Result};

/// Options applied when a store is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject edges whose endpoints are not in `nodes`. Off by default:
    /// referential integrity is declared in the schema but advisory.
    pub enforce_foreign_keys: bool,
}

/// Durable node/edge storage in a single SQLite file.
pub struct GraphStore {
    /// `None` once the store has been closed.
    conn: Mutex<Option<Connection>>,
    db_path: PathBuf,
}

impl GraphStore {
    /// Open or create the store at `db_path` with default options.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(db_path, StoreOptions::default())
    }

    /// Open or create the store at `db_path`.
    pub fn open_with(db_path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Self::create_connection(&db_path, options)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(Some(conn)),
            db_path,
        };

        info!(
            "GraphStore opened: {} nodes, {} edges, foreign_keys={}, path={}",
            store.count_nodes()?,
            store.count_edges()?,
            options.enforce_foreign_keys,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path, options: StoreOptions) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        let foreign_keys = if options.enforce_foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = {};",
            foreign_keys
        ))
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    /// Run `f` against the open connection, or fail if the store is closed.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.conn.lock();
        let conn = guard.as_mut().ok_or(Error::StoreClosed)?;
        f(conn)
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Insert a node, or replace type, label and properties of the node
    /// already stored under the same id.
    pub fn upsert_node(&self, node: &Node) -> Result<()> {
        self.with_conn(|conn| upsert_node_in(conn, node))
    }

    /// Append an edge. Edges have no natural key: the same edge written
    /// twice is stored twice.
    pub fn add_edge(&self, edge: &Edge) -> Result<()> {
        self.with_conn(|conn| insert_edge_in(conn, edge))
    }

    /// Upsert every node in one transaction. Returns the number written.
    pub fn add_nodes<'a, I>(&self, nodes: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Node>,
    {
        let count = self.with_conn(|conn| {
            in_transaction(conn, |tx| {
                let mut count = 0;
                for node in nodes {
                    upsert_node_in(tx, node)?;
                    count += 1;
                }
                Ok(count)
            })
        })?;
        debug!("Committed {} nodes", count);
        Ok(count)
    }

    /// Append every edge in one transaction. Returns the number written.
    pub fn add_edges<'a, I>(&self, edges: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let count = self.with_conn(|conn| {
            in_transaction(conn, |tx| {
                let mut count = 0;
                for edge in edges {
                    insert_edge_in(tx, edge)?;
                    count += 1;
                }
                Ok(count)
            })
        })?;
        debug!("Committed {} edges", count);
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// All stored nodes, in first-insertion order.
    pub fn fetch_nodes(&self) -> Result<Vec<Node>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(SELECT_NODES_SQL)
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .map_err(|e| Error::Database(e.to_string()))?;

            let mut nodes = Vec::new();
            for row in rows {
                let (id, node_type, label, properties) =
                    row.map_err(|e| Error::Database(e.to_string()))?;
                nodes.push(
                    Node::new(id, node_type, label).with_properties(decode_properties(&properties)?),
                );
            }
            Ok(nodes)
        })
    }

    /// All stored edges, in insertion order.
    pub fn fetch_edges(&self) -> Result<Vec<Edge>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(SELECT_EDGES_SQL)
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })
                .map_err(|e| Error::Database(e.to_string()))?;

            let mut edges = Vec::new();
            for row in rows {
                let (source, target, edge_type, weight, properties) =
                    row.map_err(|e| Error::Database(e.to_string()))?;
                edges.push(
                    Edge::new(source, target, edge_type)
                        .with_weight(weight)
                        .with_properties(decode_properties(&properties)?),
                );
            }
            Ok(edges)
        })
    }

    pub fn count_nodes(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM nodes")
    }

    pub fn count_edges(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM edges")
    }

    fn count(&self, sql: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.query_row(sql, [], |row| row.get(0))
                .map_err(|e| Error::Database(e.to_string()))
        })
    }

    /// Row counts and file size.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_nodes = self.count_nodes()?;
        let total_edges = self.count_edges()?;
        let db_size_bytes = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(StoreStats {
            total_nodes,
            total_edges,
            db_path: self.db_path.display().to_string(),
            db_size_bytes,
        })
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Release the connection. Every later call fails with
    /// [`Error::StoreClosed`], including a second `close`.
    pub fn close(&self) -> Result<()> {
        let conn = self.conn.lock().take().ok_or(Error::StoreClosed)?;
        conn.close().map_err(|(_, e)| Error::Database(e.to_string()))?;
        debug!("GraphStore closed: {}", self.db_path.display());
        Ok(())
    }
}

/// Run `f` inside a transaction. Dropping an uncommitted transaction rolls
/// it back, so the connection stays usable after an error.
fn in_transaction<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(e.to_string()))?;
    let value = f(&tx)?;
    tx.commit().map_err(|e| Error::Database(e.to_string()))?;
    Ok(value)
}

fn upsert_node_in(conn: &Connection, node: &Node) -> Result<()> {
    let properties = serde_json::to_string(node.properties())?;
    conn.prepare_cached(UPSERT_NODE_SQL)
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![node.node_id(), node.node_type(), node.label(), properties])
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(())
}

fn insert_edge_in(conn: &Connection, edge: &Edge) -> Result<()> {
    let properties = serde_json::to_string(edge.properties())?;
    conn.prepare_cached(INSERT_EDGE_SQL)
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            edge.source_id(),
            edge.target_id(),
            edge.edge_type(),
            edge.weight(),
            properties,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(())
}

fn decode_properties(raw: &str) -> Result<Properties> {
    Ok(serde_json::from_str(raw)?)
}
