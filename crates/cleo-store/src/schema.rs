//! Database schema SQL.

/// Node and edge tables. `properties` holds a JSON object as text.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    label TEXT NOT NULL,
    properties TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    type TEXT NOT NULL,
    weight REAL NOT NULL,
    properties TEXT NOT NULL,
    FOREIGN KEY(source_id) REFERENCES nodes(id),
    FOREIGN KEY(target_id) REFERENCES nodes(id)
);

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
"#;

/// Insert-or-replace keyed by node id. Existing rows keep their rowid.
pub const UPSERT_NODE_SQL: &str = "INSERT INTO nodes (id, type, label, properties) \
     VALUES (?1, ?2, ?3, ?4) \
     ON CONFLICT(id) DO UPDATE SET \
         type = excluded.type, \
         label = excluded.label, \
         properties = excluded.properties";

pub const INSERT_EDGE_SQL: &str = "INSERT INTO edges (source_id, target_id, type, weight, properties) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

pub const SELECT_NODES_SQL: &str = "SELECT id, type, label, properties FROM nodes ORDER BY rowid";

pub const SELECT_EDGES_SQL: &str =
    "SELECT source_id, target_id, type, weight, properties FROM edges ORDER BY id";

/// Tables a Cleo database must contain.
pub const REQUIRED_TABLES: [&str; 2] = ["nodes", "edges"];
