//! Import pipeline: parsed graph → store.

use serde::Serialize;

use crate::history::ParsedGraph;
use cleo_core::Result;
use cleo_store::GraphStore;

/// Counts written by one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Writes parsed history into a [`GraphStore`].
///
/// Nodes are upserted, edges appended: importing the same file twice leaves
/// the node set unchanged and doubles the edges.
pub struct Importer<'a> {
    store: &'a GraphStore,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Write an already parsed graph: nodes first, then edges, each batch
    /// in its own transaction.
    pub fn import_graph(&self, graph: &ParsedGraph) -> Result<ImportSummary> {
        let nodes = self.store.add_nodes(&graph.nodes)?;
        let edges = self.store.add_edges(&graph.edges)?;
        Ok(ImportSummary { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::parse_str;
    use tempfile::TempDir;

    const HISTORY: &str = r#"[
        {"title": "Song A", "titleUrl": "http://x/a", "time": "2023-01-01T00:00:00Z",
         "subtitles": [{"name": "Chan", "url": "http://c"}]},
        {"title": "Song B", "titleUrl": "http://x/b", "time": "2023-01-02T00:00:00Z",
         "subtitles": [{"name": "Chan", "url": "http://c"}]}
    ]"#;

    fn test_store() -> (GraphStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(dir.path().join("graph.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_import_graph_counts() {
        let (store, _dir) = test_store();
        let graph = parse_str(HISTORY).unwrap();
        let summary = Importer::new(&store).import_graph(&graph).unwrap();
        assert_eq!(summary, ImportSummary { nodes: 4, edges: 4 });
        assert_eq!(store.fetch_nodes().unwrap(), graph.nodes);
        assert_eq!(store.fetch_edges().unwrap(), graph.edges);
    }

    #[test]
    fn test_reimport_is_node_idempotent_but_duplicates_edges() {
        let (store, _dir) = test_store();
        let importer = Importer::new(&store);
        importer.import_graph(&parse_str(HISTORY).unwrap()).unwrap();
        let nodes_once = store.fetch_nodes().unwrap();

        importer.import_graph(&parse_str(HISTORY).unwrap()).unwrap();
        assert_eq!(store.fetch_nodes().unwrap(), nodes_once);
        assert_eq!(store.count_edges().unwrap(), 8);
    }
}
