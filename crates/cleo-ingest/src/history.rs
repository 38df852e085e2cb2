//! Watch-history export parser.
//!
//! Turns the JSON array from a Takeout `watch-history.json` into graph
//! entities: one synthetic user node, one node per distinct video and
//! channel, and a `watched` + `published` edge pair per entry.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::normalize::{normalize_timestamp, slugify};
use cleo_core::{Error, Result};
use cleo_store::{edge_types, node_types, Edge, Node, USER_NODE_ID};

pub const USER_LABEL: &str = "You";
pub const UNKNOWN_VIDEO: &str = "Unknown video";
pub const UNKNOWN_CHANNEL: &str = "Unknown channel";

/// Nodes and edges produced from one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGraph {
    /// User node first, then videos and channels in first-seen order.
    pub nodes: Vec<Node>,
    /// Two edges per entry, in input order.
    pub edges: Vec<Edge>,
}

/// Insertion-ordered node collection where the first node per id wins.
#[derive(Default)]
struct NodeSet {
    nodes: Vec<Node>,
    seen: HashSet<String>,
}

impl NodeSet {
    fn insert_if_absent(&mut self, node_id: &str, make: impl FnOnce() -> Node) {
        if self.seen.insert(node_id.to_string()) {
            self.nodes.push(make());
        }
    }

    fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}

/// Non-empty string field of an entry. Missing, empty and non-string
/// values all count as absent.
fn text_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// `name`/`url` of the first `subtitles` element, if any.
fn first_subtitle(entry: &Value) -> Option<&Value> {
    entry
        .get("subtitles")
        .and_then(|v| v.as_array())
        .and_then(|subs| subs.first())
        .filter(|v| v.is_object())
}

/// Parse already-decoded history entries. Never fails: unexpected shapes
/// fall back to defaults.
pub fn parse_entries(entries: &[Value]) -> ParsedGraph {
    let mut nodes = NodeSet::default();
    let mut edges = Vec::with_capacity(entries.len() * 2);

    nodes.insert_if_absent(USER_NODE_ID, || {
        Node::new(USER_NODE_ID, node_types::USER, USER_LABEL)
    });

    for (position, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            debug!("History entry {} is not an object, using defaults", position);
        }

        let title = text_field(entry, "title").unwrap_or(UNKNOWN_VIDEO);
        let title_url = text_field(entry, "titleUrl").unwrap_or("");
        let watched_at = text_field(entry, "time").and_then(normalize_timestamp);

        let video_key = if title_url.is_empty() { title } else { title_url };
        let video_node_id = format!("video:{}", slugify(video_key));
        nodes.insert_if_absent(&video_node_id, || {
            Node::new(&video_node_id, node_types::VIDEO, title)
                .with_property("url", title_url)
                .with_property("raw_id", entry.get("details").cloned().unwrap_or(Value::Null))
        });

        let subtitle = first_subtitle(entry);
        let channel_name = subtitle
            .and_then(|s| text_field(s, "name"))
            .unwrap_or(UNKNOWN_CHANNEL);
        let channel_url = subtitle.and_then(|s| text_field(s, "url")).unwrap_or("");
        let channel_node_id = format!("channel:{}", slugify(channel_name));
        nodes.insert_if_absent(&channel_node_id, || {
            Node::new(&channel_node_id, node_types::CHANNEL, channel_name)
                .with_property("url", channel_url)
        });

        edges.push(
            Edge::new(USER_NODE_ID, &video_node_id, edge_types::WATCHED)
                .with_property("watched_at", json!(watched_at)),
        );
        edges.push(
            Edge::new(&channel_node_id, &video_node_id, edge_types::PUBLISHED)
                .with_property("observed_at", json!(watched_at)),
        );
    }

    let nodes = nodes.into_vec();
    info!(
        "Parsed {} history entries into {} nodes and {} edges",
        entries.len(),
        nodes.len(),
        edges.len()
    );
    ParsedGraph { nodes, edges }
}

/// Decode a history export and parse it. The document must be a JSON array.
pub fn parse_str(raw: &str) -> Result<ParsedGraph> {
    let entries = decode_entries(raw)?;
    Ok(parse_entries(&entries))
}

/// Read and parse a history export file.
pub fn parse_watch_history(path: impl AsRef<Path>) -> Result<ParsedGraph> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", raw.len(), path.display());
    parse_str(&raw)
}

/// Read the raw entries of a history export file.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    decode_entries(&raw)
}

fn decode_entries(raw: &str) -> Result<Vec<Value>> {
    let payload: Value = serde_json::from_str(raw)
        .map_err(|e| Error::Parse(format!("history is not valid JSON: {}", e)))?;
    match payload {
        Value::Array(entries) => Ok(entries),
        other => Err(Error::Parse(format!(
            "history must be a JSON array of entries, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(graph: &ParsedGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.node_id()).collect()
    }

    #[test]
    fn test_empty_history_has_user_node() {
        let graph = parse_entries(&[]);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0], Node::new("user:self", "user", "You"));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_single_entry() {
        let graph = parse_str(
            r#"[{"title": "Song A", "titleUrl": "http://x/a", "time": "2023-01-01T00:00:00Z",
                 "subtitles": [{"name": "Chan"}]}]"#,
        )
        .unwrap();

        assert_eq!(ids(&graph), vec!["user:self", "video:http://x/a", "channel:chan"]);
        assert_eq!(graph.nodes[1].label(), "Song A");
        assert_eq!(graph.nodes[1].properties()["url"], "http://x/a");
        assert_eq!(graph.nodes[1].properties()["raw_id"], Value::Null);
        assert_eq!(graph.nodes[2].label(), "Chan");
        assert_eq!(graph.nodes[2].properties()["url"], "");

        assert_eq!(graph.edges.len(), 2);
        let watched = &graph.edges[0];
        assert_eq!(watched.edge_type(), "watched");
        assert_eq!(watched.source_id(), "user:self");
        assert_eq!(watched.target_id(), "video:http://x/a");
        assert_eq!(watched.weight(), 1.0);
        assert_eq!(watched.properties()["watched_at"], "2023-01-01T00:00:00+00:00");

        let published = &graph.edges[1];
        assert_eq!(published.edge_type(), "published");
        assert_eq!(published.source_id(), "channel:chan");
        assert_eq!(published.target_id(), "video:http://x/a");
        assert_eq!(published.properties()["observed_at"], "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_missing_subtitles_gives_unknown_channel() {
        let graph = parse_entries(&[json!({"title": "Clip"})]);
        let channel = graph
            .nodes
            .iter()
            .find(|n| n.node_type() == "channel")
            .unwrap();
        assert_eq!(channel.node_id(), "channel:unknown_channel");
        assert_eq!(channel.label(), "Unknown channel");
        assert_eq!(channel.properties()["url"], "");
    }

    #[test]
    fn test_entry_without_any_field() {
        let graph = parse_entries(&[json!({})]);
        assert_eq!(
            ids(&graph),
            vec!["user:self", "video:unknown_video", "channel:unknown_channel"]
        );
        assert_eq!(graph.edges[0].properties()["watched_at"], Value::Null);
        assert_eq!(graph.edges[1].properties()["observed_at"], Value::Null);
    }

    #[test]
    fn test_title_used_when_url_missing() {
        let graph = parse_entries(&[json!({"title": "My  Great Video", "titleUrl": ""})]);
        assert_eq!(graph.nodes[1].node_id(), "video:my_great_video");
        assert_eq!(graph.nodes[1].properties()["url"], "");
    }

    #[test]
    fn test_url_case_maps_to_same_video() {
        let graph = parse_entries(&[
            json!({"title": "First", "titleUrl": "https://YouTube.com/watch?v=AbC"}),
            json!({"title": "Second", "titleUrl": "https://youtube.com/WATCH?v=abc"}),
        ]);
        let videos: Vec<&Node> = graph
            .nodes
            .iter()
            .filter(|n| n.node_type() == "video")
            .collect();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].label(), "First");
        assert_eq!(graph.edges[0].target_id(), graph.edges[2].target_id());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let graph = parse_entries(&[
            json!({"title": "A", "titleUrl": "http://x/a", "details": "first",
                   "subtitles": [{"name": "Chan", "url": "http://c/1"}]}),
            json!({"title": "A renamed", "titleUrl": "http://x/a", "details": "second",
                   "subtitles": [{"name": "CHAN", "url": "http://c/2"}]}),
        ]);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[1].label(), "A");
        assert_eq!(graph.nodes[1].properties()["raw_id"], "first");
        assert_eq!(graph.nodes[2].label(), "Chan");
        assert_eq!(graph.nodes[2].properties()["url"], "http://c/1");
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn test_edge_order_follows_input() {
        let graph = parse_entries(&[
            json!({"titleUrl": "http://x/1", "subtitles": [{"name": "One"}]}),
            json!({"titleUrl": "http://x/2", "subtitles": [{"name": "Two"}]}),
        ]);
        let summary: Vec<(&str, &str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.edge_type(), e.source_id(), e.target_id()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("watched", "user:self", "video:http://x/1"),
                ("published", "channel:one", "video:http://x/1"),
                ("watched", "user:self", "video:http://x/2"),
                ("published", "channel:two", "video:http://x/2"),
            ]
        );
    }

    #[test]
    fn test_unparseable_time_kept_raw() {
        let graph = parse_entries(&[json!({"title": "T", "time": "last tuesday"})]);
        assert_eq!(graph.edges[0].properties()["watched_at"], "last tuesday");
        assert_eq!(graph.edges[1].properties()["observed_at"], "last tuesday");
    }

    #[test]
    fn test_odd_shapes_are_defaulted() {
        let graph = parse_entries(&[
            json!("not an object"),
            json!({"title": 42, "subtitles": "nope", "time": 17}),
            json!({"title": "T", "subtitles": []}),
            json!({"title": "U", "subtitles": [null, {"name": "Ignored"}]}),
        ]);
        assert_eq!(graph.edges.len(), 8);
        assert!(graph
            .edges
            .iter()
            .filter(|e| e.edge_type() == "published")
            .all(|e| e.source_id() == "channel:unknown_channel"));
    }

    #[test]
    fn test_details_preserved_as_raw_id() {
        let graph = parse_entries(&[json!({"title": "T", "details": [{"name": "From Google Ads"}]})]);
        assert_eq!(
            graph.nodes[1].properties()["raw_id"],
            json!([{"name": "From Google Ads"}])
        );
    }

    #[test]
    fn test_edge_count_is_twice_entries() {
        let entries: Vec<Value> = (0..25)
            .map(|i| json!({"title": format!("Video {}", i % 7), "subtitles": [{"name": format!("C{}", i % 3)}]}))
            .collect();
        let graph = parse_entries(&entries);
        assert_eq!(graph.edges.len(), 50);
        assert_eq!(graph.nodes.len(), 1 + 7 + 3);
    }

    #[test]
    fn test_non_array_is_parse_error() {
        assert!(matches!(parse_str(r#"{"title": "x"}"#), Err(Error::Parse(_))));
        assert!(matches!(parse_str("not json"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_watch_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch-history.json");
        std::fs::write(&path, r#"[{"title": "A"}, {"title": "B"}]"#).unwrap();

        let graph = parse_watch_history(&path).unwrap();
        assert_eq!(graph.edges.len(), 4);
        assert_eq!(read_entries(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_watch_history(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
