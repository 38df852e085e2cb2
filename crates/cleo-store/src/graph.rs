//! In-memory view of a stored graph, built with petgraph.
//!
//! The store keeps referential integrity advisory, so the view is where
//! dangling edges get noticed.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Edge, Node};

/// Directed graph assembled from fetched nodes and edges.
pub struct GraphView {
    graph: DiGraph<Node, Edge>,
    dangling: Vec<Edge>,
}

impl GraphView {
    /// Build a view. Later nodes with an id already seen replace the
    /// earlier one. Edges pointing at unknown ids are kept aside as dangling.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_index: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            match node_index.get(node.node_id()) {
                Some(&idx) => graph[idx] = node,
                None => {
                    let id = node.node_id().to_string();
                    let idx = graph.add_node(node);
                    node_index.insert(id, idx);
                }
            }
        }

        let mut dangling = Vec::new();
        for edge in edges {
            let source = node_index.get(edge.source_id()).copied();
            let target = node_index.get(edge.target_id()).copied();
            match (source, target) {
                (Some(s), Some(t)) => {
                    graph.add_edge(s, t, edge);
                }
                _ => dangling.push(edge),
            }
        }

        Self { graph, dangling }
    }

    /// Edges whose source or target is not a known node.
    pub fn dangling_edges(&self) -> &[Edge] {
        &self.dangling
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut nodes_by_type = BTreeMap::new();
        for node in self.graph.node_weights() {
            *nodes_by_type.entry(node.node_type().to_string()).or_insert(0) += 1;
        }

        let mut edges_by_type = BTreeMap::new();
        let all_edges = self.graph.edge_weights().chain(self.dangling.iter());
        for edge in all_edges {
            *edges_by_type.entry(edge.edge_type().to_string()).or_insert(0) += 1;
        }

        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count() + self.dangling.len(),
            dangling_edges: self.dangling.len(),
            nodes_by_type,
            edges_by_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    /// All edges, dangling ones included.
    pub edge_count: usize,
    pub dangling_edges: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub edges_by_type: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::USER_NODE_ID;

    fn sample() -> GraphView {
        let nodes = vec![
            Node::new(USER_NODE_ID, "user", "You"),
            Node::new("video:a", "video", "A"),
            Node::new("video:b", "video", "B"),
            Node::new("channel:c", "channel", "C"),
        ];
        let edges = vec![
            Edge::new(USER_NODE_ID, "video:a", "watched"),
            Edge::new("channel:c", "video:a", "published"),
            Edge::new(USER_NODE_ID, "video:b", "watched"),
            Edge::new("channel:gone", "video:b", "published"),
        ];
        GraphView::from_parts(nodes, edges)
    }

    #[test]
    fn test_stats_by_type() {
        let stats = sample().stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.dangling_edges, 1);
        assert_eq!(stats.nodes_by_type["video"], 2);
        assert_eq!(stats.nodes_by_type["user"], 1);
        assert_eq!(stats.edges_by_type["watched"], 2);
        assert_eq!(stats.edges_by_type["published"], 2);
    }

    #[test]
    fn test_dangling_edges_reported() {
        let view = sample();
        assert_eq!(view.dangling_edges().len(), 1);
        assert_eq!(view.dangling_edges()[0].source_id(), "channel:gone");
    }

    #[test]
    fn test_duplicate_node_ids_collapse() {
        let view = GraphView::from_parts(
            vec![
                Node::new("video:a", "video", "Old"),
                Node::new("video:a", "video", "New"),
            ],
            Vec::new(),
        );
        let stats = view.stats();
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.nodes_by_type["video"], 1);
    }
}
