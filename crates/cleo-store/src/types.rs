//! Graph model: nodes, edges, and their free-form properties.

use serde::{Deserialize, Serialize};

/// Open, string-keyed metadata attached to nodes and edges.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Identifier of the synthetic node standing for the history owner.
pub const USER_NODE_ID: &str = "user:self";

/// Node type tags produced by the history parser.
pub mod node_types {
    pub const USER: &str = "user";
    pub const VIDEO: &str = "video";
    pub const CHANNEL: &str = "channel";
}

/// Edge type tags produced by the history parser.
pub mod edge_types {
    pub const WATCHED: &str = "watched";
    pub const PUBLISHED: &str = "published";
}

/// Weight given to edges that do not set one.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// A graph vertex: user, video, channel, or any other tagged entity.
///
/// Equality is structural. Use [`Node::same_entity`] when only identity
/// matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    node_id: String,
    node_type: String,
    label: String,
    #[serde(default)]
    properties: Properties,
}

impl Node {
    pub fn new(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            label: label.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Two nodes with the same id are the same logical entity.
    pub fn same_entity(&self, other: &Node) -> bool {
        self.node_id == other.node_id
    }
}

/// A directed, typed, weighted relation between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    source_id: String,
    target_id: String,
    edge_type: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    properties: Properties,
}

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

impl Edge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type: edge_type.into(),
            weight: DEFAULT_EDGE_WEIGHT,
            properties: Properties::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn edge_type(&self) -> &str {
        &self.edge_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Row counts and location of a graph database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_nodes: i64,
    pub total_edges: i64,
    pub db_path: String,
    pub db_size_bytes: u64,
}
