//! # graphx Algorithms
//!
//! Whole-graph analytics over a borrowed [`graphx_core::Graph`].
//!
//! ## Features
//!
//! - **Community detection**: Single-level modularity optimisation (Louvain local moving)
//! - **PageRank**: Power iteration with dangling-node redistribution
//! - **Shortest paths**: BFS hop counts and Dijkstra over non-negative weights
//!
//! Every algorithm borrows the graph immutably and keeps its own working state,
//! so several can run over the same graph at once.
//!
//! ## Example
//!
//! ```rust
//! use graphx_algo::{PageRank, ShortestPath};
//! use graphx_core::Graph;
//!
//! let mut graph = Graph::new(true, false);
//! graph.add_default_edge("A", "B");
//! graph.add_default_edge("B", "C");
//! graph.add_default_edge("C", "A");
//!
//! let ranks = PageRank::new(&graph).compute();
//! assert!((ranks.sum() - 1.0).abs() < 1e-9);
//!
//! let paths = ShortestPath::new(&graph).bfs("A").unwrap();
//! assert_eq!(paths.get("C").unwrap().path, vec!["A", "B", "C"]);
//! ```

pub mod community;
pub mod pagerank;
pub mod shortest_path;

pub use community::{CommunityConfig, CommunityDetection, CommunityId, CommunityResult};
pub use pagerank::{PageRank, PageRankConfig, PageRankResult};
pub use shortest_path::{Metric, PathResult, ShortestPath, ShortestPaths, UNREACHABLE};
