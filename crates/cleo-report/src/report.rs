//! HTML graph report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::template::{escape_html, fill, script_safe_json, GRAPH_REPORT_HTML};
use cleo_core::Result;
use cleo_store::{Edge, GraphStats, GraphStore, GraphView, Node};

pub const REPORT_TITLE: &str = "Cleo Graph Report";

/// Node as the page's force layout sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePayload<'a> {
    pub id: &'a str,
    pub label: &'a str,
    #[serde(rename = "type")]
    pub node_type: &'a str,
}

impl<'a> From<&'a Node> for NodePayload<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            id: node.node_id(),
            label: node.label(),
            node_type: node.node_type(),
        }
    }
}

/// Edge as the page's force layout sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkPayload<'a> {
    pub source: &'a str,
    pub target: &'a str,
    #[serde(rename = "type")]
    pub edge_type: &'a str,
    pub weight: f64,
}

impl<'a> From<&'a Edge> for LinkPayload<'a> {
    fn from(edge: &'a Edge) -> Self {
        Self {
            source: edge.source_id(),
            target: edge.target_id(),
            edge_type: edge.edge_type(),
            weight: edge.weight(),
        }
    }
}

/// Render the report page for the given graph.
pub fn render_graph(nodes: &[Node], edges: &[Edge]) -> Result<String> {
    let node_payload: Vec<NodePayload<'_>> = nodes.iter().map(NodePayload::from).collect();
    let link_payload: Vec<LinkPayload<'_>> = edges.iter().map(LinkPayload::from).collect();

    let stats = GraphView::from_parts(nodes.to_vec(), edges.to_vec()).stats();
    if stats.dangling_edges > 0 {
        warn!(
            "{} edges reference missing nodes; the layout will not place them",
            stats.dangling_edges
        );
    }

    let summary = format!("Imported {} nodes and {} edges.", nodes.len(), edges.len());
    let breakdown = escape_html(&type_breakdown(&stats));
    let nodes_json = script_safe_json(&serde_json::to_string(&node_payload)?);
    let links_json = script_safe_json(&serde_json::to_string(&link_payload)?);

    Ok(fill(
        GRAPH_REPORT_HTML,
        &[
            ("title", REPORT_TITLE),
            ("summary", summary.as_str()),
            ("breakdown", breakdown.as_str()),
            ("nodes", nodes_json.as_str()),
            ("links", links_json.as_str()),
        ],
    ))
}

/// `channel: 2 · user: 1 · video: 3`, plus a dangling-edge count if any.
fn type_breakdown(stats: &GraphStats) -> String {
    let mut parts: Vec<String> = stats
        .nodes_by_type
        .iter()
        .map(|(node_type, count)| format!("{}: {}", node_type, count))
        .collect();
    if stats.dangling_edges > 0 {
        parts.push(format!("dangling edges: {}", stats.dangling_edges));
    }
    parts.join(" · ")
}

/// Render the report page for everything in `store`.
pub fn render(store: &GraphStore) -> Result<String> {
    let nodes = store.fetch_nodes()?;
    let edges = store.fetch_edges()?;
    render_graph(&nodes, &edges)
}

/// Render `store` and write the page to `output_path`, creating parent
/// directories as needed.
pub fn write_report(store: &GraphStore, output_path: &Path) -> Result<PathBuf> {
    let html = render(store)?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, html)?;
    info!("Report written to {}", output_path.display());
    Ok(output_path.to_path_buf())
}

/// Open the database, render its graph to `output_path`, and close it.
pub fn generate_html_report(
    db_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let store = GraphStore::open(db_path)?;
    let report_path = write_report(&store, output_path.as_ref())?;
    store.close()?;
    Ok(report_path)
}
