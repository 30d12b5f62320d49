// Adjacency-list graph - nodes live in an id-keyed arena, edges point at arena slots
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dense handle into a [`Graph`]'s node arena.
///
/// Handles are only meaningful for the graph that issued them. Using a handle
/// from another graph panics on out-of-range access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A vertex. Identity is the `id`; attributes are caller-owned metadata
/// that no algorithm reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{{{}}}", self.id)
    }
}

impl From<&str> for Node {
    fn from(id: &str) -> Self {
        Node::new(id)
    }
}

impl From<String> for Node {
    fn from(id: String) -> Self {
        Node::new(id)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}

/// A directed, weighted edge record. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    source: NodeIndex,
    target: NodeIndex,
    weight: f64,
}

impl Edge {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    #[inline]
    #[must_use]
    pub const fn new(source: NodeIndex, target: NodeIndex, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }

    #[inline]
    pub const fn source(&self) -> NodeIndex {
        self.source
    }

    #[inline]
    pub const fn target(&self) -> NodeIndex {
        self.target
    }

    #[inline]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// In-memory graph with insertion-ordered nodes and outgoing edge lists.
///
/// - Adding an edge registers missing endpoints.
/// - Unweighted graphs store every edge with weight 1.0.
/// - Undirected graphs store a mirror record for every edge, so an
///   undirected A-B edge shows up in both adjacency lists and counts twice
///   in [`Graph::total_edge_weight`].
///
/// Algorithms take `&Graph` and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    weighted: bool,
    nodes: Vec<Node>,
    index: AHashMap<String, NodeIndex>,
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    #[must_use]
    pub fn new(directed: bool, weighted: bool) -> Self {
        Self {
            directed,
            weighted,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edge records (mirrors included).
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a node. Re-adding an existing id is a no-op that returns the
    /// existing handle; the first registration's attributes are kept.
    pub fn add_node(&mut self, node: impl Into<Node>) -> NodeIndex {
        let node = node.into();
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Insert an edge, applying the weighted/directed coercions.
    pub fn add_edge(
        &mut self,
        source: impl Into<Node>,
        destination: impl Into<Node>,
        weight: f64,
    ) -> (NodeIndex, NodeIndex) {
        let from = self.add_node(source);
        let to = self.add_node(destination);
        let weight = if self.weighted { weight } else { Edge::DEFAULT_WEIGHT };

        self.adjacency[from.0].push(Edge::new(from, to, weight));
        if !self.directed {
            self.adjacency[to.0].push(Edge::new(to, from, weight));
        }
        (from, to)
    }

    pub fn add_default_edge(
        &mut self,
        source: impl Into<Node>,
        destination: impl Into<Node>,
    ) -> (NodeIndex, NodeIndex) {
        self.add_edge(source, destination, Edge::DEFAULT_WEIGHT)
    }

    /// Nodes in insertion order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(NodeIndex)
    }

    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| self.node(idx))
    }

    #[inline]
    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every stored edge record, grouped by source in node order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }

    #[inline]
    pub fn edges_at(&self, idx: NodeIndex) -> &[Edge] {
        &self.adjacency[idx.0]
    }

    /// Outgoing edges of `id`, or an empty slice when the node is absent.
    pub fn edges_from(&self, id: &str) -> &[Edge] {
        match self.index_of(id) {
            Some(idx) => self.edges_at(idx),
            None => &[],
        }
    }

    /// Edge destinations of `id` in edge order. Parallel edges repeat.
    pub fn neighbors(&self, id: &str) -> Vec<&Node> {
        self.edges_from(id)
            .iter()
            .map(|edge| self.node(edge.target))
            .collect()
    }

    pub fn neighbor_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.edges_at(idx).iter().map(Edge::target)
    }

    /// Count of outgoing edge records.
    pub fn degree(&self, id: &str) -> usize {
        self.edges_from(id).len()
    }

    pub fn total_edge_weight(&self) -> f64 {
        self.edges().map(Edge::weight).sum()
    }

    /// Induced subgraph over `ids`, with the same flags.
    ///
    /// Every requested id becomes a node, including ids this graph does not
    /// hold. Edge records are copied as stored, so undirected mirrors are not
    /// duplicated.
    pub fn subgraph<I, S>(&self, ids: I) -> Graph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep = vec![false; self.nodes.len()];
        let mut foreign = Vec::new();
        for id in ids {
            match self.index_of(id.as_ref()) {
                Some(idx) => keep[idx.0] = true,
                None => foreign.push(Node::new(id.as_ref())),
            }
        }

        let mut sub = Graph::new(self.directed, self.weighted);
        let mut remap: Vec<Option<NodeIndex>> = vec![None; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if keep[i] {
                remap[i] = Some(sub.add_node(node.clone()));
            }
        }
        for node in foreign {
            sub.add_node(node);
        }

        for (i, edges) in self.adjacency.iter().enumerate() {
            let Some(from) = remap[i] else { continue };
            for edge in edges {
                if let Some(to) = remap[edge.target.0] {
                    sub.adjacency[from.0].push(Edge::new(from, to, edge.weight));
                }
            }
        }
        sub
    }
}
