//! # graphx
//!
//! In-memory weighted graph analytics.
//!
//! graphx takes a populated graph and answers four questions about it: which
//! vertices cluster together (modularity-based community detection), which
//! are most influential (PageRank), how far apart two vertices are (BFS and
//! Dijkstra), and how much two vertices' neighbourhoods overlap (Jaccard).
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! graphx --input graph.json pagerank --damping-factor 0.85
//! graphx --input graph.json communities --seed 42
//! graphx --input graph.json paths --source A --weighted
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use graphx::prelude::*;
//!
//! let mut graph = Graph::new(false, true);
//! graph.add_edge("A", "B", 1.0);
//! graph.add_edge("B", "C", 2.0);
//! graph.add_edge("C", "D", 1.0);
//!
//! let ranks = PageRank::new(&graph).compute();
//! assert_eq!(ranks.len(), 4);
//!
//! let paths = ShortestPath::new(&graph).dijkstra("A").unwrap();
//! assert_eq!(paths.get("D").unwrap().distance, 4.0);
//!
//! let communities = CommunityDetection::with_config(&graph, CommunityConfig::new().with_seed(1))
//!     .unwrap()
//!     .detect();
//! assert!(communities.modularity >= -1.0 && communities.modularity <= 1.0);
//! ```
//!
//! ## Crate Structure
//!
//! - [`graphx-core`](https://docs.rs/graphx-core) - Graph model, errors and the JSON document form
//! - [`graphx-algo`](https://docs.rs/graphx-algo) - Community detection, PageRank, shortest paths
//! - [`graphx-similarity`](https://docs.rs/graphx-similarity) - Jaccard neighbourhood similarity

pub mod report;

// Re-export core types
pub use graphx_core::{Edge, EdgeRecord, Error, Graph, GraphDocument, Node, NodeIndex, Result};

// Re-export algorithms
pub use graphx_algo::{
    CommunityConfig, CommunityDetection, CommunityId, CommunityResult,
    Metric, PageRank, PageRankConfig, PageRankResult,
    PathResult, ShortestPath, ShortestPaths, UNREACHABLE,
};

pub use graphx_similarity::{JaccardSimilarity, SimilarityPair};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CommunityConfig, CommunityDetection, CommunityResult,
        Error, Graph, GraphDocument, JaccardSimilarity, Metric, Node,
        PageRank, PageRankConfig, PageRankResult, Result,
        ShortestPath, ShortestPaths,
    };
}
