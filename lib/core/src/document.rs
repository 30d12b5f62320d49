//! JSON interchange form of a [`Graph`].
//!
//! The data-access layer that materialises a graph (from a remote store, a
//! file, a test fixture) hands it over as a `GraphDocument`. Building the
//! graph goes through [`Graph::add_node`] and [`Graph::add_edge`], so the
//! weighted/directed coercions apply exactly as they would for hand-built
//! graphs.

use crate::{Edge, Graph, Node, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub weighted: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    Edge::DEFAULT_WEIGHT
}

impl GraphDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Materialise the document. Nodes are registered first, in document
    /// order, then edges.
    pub fn into_graph(self) -> Graph {
        let mut graph = Graph::new(self.directed, self.weighted);
        for node in self.nodes {
            graph.add_node(node);
        }
        for edge in self.edges {
            graph.add_edge(edge.source, edge.target, edge.weight);
        }
        graph
    }

    /// Inverse of [`GraphDocument::into_graph`]. For undirected graphs each
    /// mirrored pair of records is emitted once.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut edges = Vec::new();
        if graph.is_directed() {
            for edge in graph.edges() {
                edges.push(record(graph, edge));
            }
        } else {
            // mirrors sit in the target's list in insertion order; skip one
            // pending mirror per forward record already emitted
            let mut pending: ahash::AHashMap<(usize, usize, u64), usize> = ahash::AHashMap::new();
            for edge in graph.edges() {
                let key = (edge.source().index(), edge.target().index(), edge.weight().to_bits());
                if let Some(count) = pending.get_mut(&key) {
                    if *count > 0 {
                        *count -= 1;
                        continue;
                    }
                }
                let mirror = (
                    edge.target().index(),
                    edge.source().index(),
                    edge.weight().to_bits(),
                );
                *pending.entry(mirror).or_insert(0) += 1;
                edges.push(record(graph, edge));
            }
        }

        Self {
            directed: graph.is_directed(),
            weighted: graph.is_weighted(),
            nodes: graph.nodes().to_vec(),
            edges,
        }
    }
}

fn record(graph: &Graph, edge: &Edge) -> EdgeRecord {
    EdgeRecord {
        source: graph.node(edge.source()).id.clone(),
        target: graph.node(edge.target()).id.clone(),
        weight: edge.weight(),
    }
}

impl From<GraphDocument> for Graph {
    fn from(document: GraphDocument) -> Self {
        document.into_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "directed": false,
        "weighted": true,
        "nodes": [
            {"id": "A", "attributes": {"name": "Alice"}},
            {"id": "B"}
        ],
        "edges": [
            {"source": "A", "target": "B", "weight": 2.5},
            {"source": "B", "target": "C"}
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let graph = GraphDocument::from_json_str(SAMPLE).unwrap().into_graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edges_from("A")[0].weight(), 2.5);
        assert_eq!(graph.edges_from("C")[0].weight(), 1.0);
        assert_eq!(
            graph.get_node("A").unwrap().attribute("name"),
            Some(&serde_json::json!("Alice"))
        );
    }

    #[test]
    fn test_undirected_round_trip_does_not_duplicate_mirrors() {
        let graph = GraphDocument::from_json_str(SAMPLE).unwrap().into_graph();
        let document = GraphDocument::from_graph(&graph);
        assert_eq!(document.edges.len(), 2);

        let rebuilt = document.into_graph();
        assert_eq!(rebuilt.edge_count(), graph.edge_count());
        assert_eq!(rebuilt.total_edge_weight(), graph.total_edge_weight());
    }

    #[test]
    fn test_undirected_self_loop_round_trip() {
        let mut graph = Graph::new(false, true);
        graph.add_edge("A", "A", 1.5);
        let rebuilt = GraphDocument::from_graph(&graph).into_graph();
        assert_eq!(rebuilt.edge_count(), 2);
    }

    #[test]
    fn test_directed_round_trip_keeps_every_record() {
        let mut graph = Graph::new(true, true);
        graph.add_edge("A", "B", 1.0);
        graph.add_edge("B", "A", 1.0);
        let document = GraphDocument::from_graph(&graph);
        assert_eq!(document.edges.len(), 2);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let document = GraphDocument::from_path(&path).unwrap();
        assert!(document.weighted);
        assert_eq!(document.nodes.len(), 2);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = GraphDocument::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }
}
