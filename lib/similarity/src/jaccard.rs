//! Jaccard similarity over neighbour sets.
//!
//! A node's neighbour set is the set of targets of its outgoing edges, with
//! weight and multiplicity ignored. Two nodes with no neighbours at all score
//! 1.0; a node that is not in the graph counts as having no neighbours.

use ahash::AHashSet;
use graphx_core::{Graph, Node};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Score for one unordered pair, `node_a` preceding `node_b` in node order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityPair {
    pub node_a: String,
    pub node_b: String,
    pub score: f64,
}

impl SimilarityPair {
    /// `"a,b"` key used in the pair-score mapping.
    pub fn key(&self) -> String {
        format!("{},{}", self.node_a, self.node_b)
    }
}

pub struct JaccardSimilarity<'g> {
    graph: &'g Graph,
    neighbors: Vec<AHashSet<usize>>,
}

impl<'g> JaccardSimilarity<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let neighbors: Vec<AHashSet<usize>> = graph
            .indices()
            .map(|idx| graph.neighbor_indices(idx).map(|n| n.index()).collect())
            .collect();
        Self { graph, neighbors }
    }

    /// `|N(a) ∩ N(b)| / |N(a) ∪ N(b)|`.
    pub fn compute(&self, id_a: &str, id_b: &str) -> f64 {
        let a = self.neighbor_set(id_a);
        let b = self.neighbor_set(id_b);
        score(a, b)
    }

    pub fn compute_nodes(&self, a: &Node, b: &Node) -> f64 {
        self.compute(&a.id, &b.id)
    }

    /// Every unordered pair of distinct nodes keyed `"a,b"`. With
    /// `only_non_zero`, pairs scoring 0.0 are left out.
    pub fn compute_all(&self, only_non_zero: bool) -> HashMap<String, f64> {
        self.pairs(only_non_zero)
            .into_iter()
            .map(|pair| (pair.key(), pair.score))
            .collect()
    }

    /// Same pairs as [`JaccardSimilarity::compute_all`], in node order
    /// (`i < j`).
    pub fn pairs(&self, only_non_zero: bool) -> Vec<SimilarityPair> {
        let nodes = self.graph.nodes();
        let mut pairs = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let score = score(Some(&self.neighbors[i]), Some(&self.neighbors[j]));
                if only_non_zero && score <= 0.0 {
                    continue;
                }
                pairs.push(SimilarityPair {
                    node_a: nodes[i].id.clone(),
                    node_b: nodes[j].id.clone(),
                    score,
                });
            }
        }
        pairs
    }

    /// Up to `k` pairs scoring at least `threshold`, highest first. Equal
    /// scores keep node order.
    pub fn most_similar(&self, k: usize, threshold: f64) -> Vec<SimilarityPair> {
        let mut pairs: Vec<SimilarityPair> = self
            .pairs(false)
            .into_iter()
            .filter(|pair| pair.score >= threshold)
            .collect();
        pairs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        pairs.truncate(k);
        pairs
    }

    fn neighbor_set(&self, id: &str) -> Option<&AHashSet<usize>> {
        self.graph
            .index_of(id)
            .map(|idx| &self.neighbors[idx.index()])
    }
}

fn score(a: Option<&AHashSet<usize>>, b: Option<&AHashSet<usize>>) -> f64 {
    let a_len = a.map_or(0, |s| s.len());
    let b_len = b.map_or(0, |s| s.len());
    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    let intersection = match (a, b) {
        (Some(a), Some(b)) => {
            let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
            small.iter().filter(|&n| large.contains(n)).count()
        }
        _ => 0,
    };
    let union = a_len + b_len - intersection;
    intersection as f64 / union as f64
}
