//! # graphx Similarity
//!
//! Neighbourhood similarity for vertex pairs.
//!
//! Each node's outgoing neighbour set is computed once when the scorer is
//! built; every query after that is a set intersection.
//!
//! ## Example
//!
//! ```rust
//! use graphx_core::Graph;
//! use graphx_similarity::JaccardSimilarity;
//!
//! let mut graph = Graph::new(false, false);
//! graph.add_default_edge("alice", "carol");
//! graph.add_default_edge("bob", "carol");
//! graph.add_default_edge("bob", "dave");
//!
//! let jaccard = JaccardSimilarity::new(&graph);
//! assert_eq!(jaccard.compute("alice", "bob"), 0.5);
//!
//! // every unordered pair, keyed "a,b"
//! let all = jaccard.compute_all(true);
//! assert_eq!(all.get("alice,bob"), Some(&0.5));
//! ```

pub mod jaccard;

pub use jaccard::{JaccardSimilarity, SimilarityPair};
