//! # graphx Core
//!
//! Core library for the graphx analytics engine.
//!
//! This crate provides the graph model every algorithm crate reads:
//!
//! - [`Node`] - A vertex identified by a string id, carrying opaque attributes
//! - [`Edge`] - A directed, weighted edge record between two [`NodeIndex`] handles
//! - [`Graph`] - Adjacency-list graph with directed/weighted coercions
//! - [`GraphDocument`] - JSON interchange form used at the data-access boundary
//!
//! ## Example
//!
//! ```rust
//! use graphx_core::{Graph, Node};
//!
//! // Undirected, weighted graph
//! let mut graph = Graph::new(false, true);
//! graph.add_node(Node::new("A").with_attribute("name", serde_json::json!("Alice")));
//! graph.add_edge("A", "B", 2.0);
//!
//! // The undirected edge is stored in both directions
//! assert_eq!(graph.degree("A"), 1);
//! assert_eq!(graph.degree("B"), 1);
//! assert_eq!(graph.total_edge_weight(), 4.0);
//! ```

pub mod document;
pub mod error;
pub mod graph;

pub use document::{EdgeRecord, GraphDocument};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, Node, NodeIndex};
