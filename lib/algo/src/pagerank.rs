//! PageRank via power iteration.
//!
//! Each iteration computes, for every node `v`:
//!
//! ```text
//! PR'(v) = (1 - d) / N + d * ( Σ_{u -> v} PR(u) / L(u) + D / N )
//! ```
//!
//! where `L(u)` is the number of outgoing edge records of `u` and `D` is the
//! rank currently held by dangling nodes (no outgoing edges), spread evenly
//! over the whole graph. Incoming neighbours are deduplicated, self-loops
//! count on both sides. After each iteration the ranks are rescaled to sum
//! to 1 so floating-point drift cannot accumulate.
//!
//! Iteration stops once the L1 distance between consecutive rank vectors is
//! at most `tolerance`, or after `max_iterations`.

use graphx_core::{Error, Graph, NodeIndex, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Configuration for PageRank.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Probability of following a link instead of jumping to a random node.
    /// Default: 0.85
    pub damping_factor: f64,

    /// L1 convergence threshold.
    /// Default: 1e-6
    pub tolerance: f64,

    /// Hard cap on iterations.
    /// Default: 100
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl PageRankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(Error::InvalidConfig(format!(
                "damping factor must be within [0, 1], got {}",
                self.damping_factor
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be a non-negative finite number, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ranks keyed by node id, in graph node order.
#[derive(Debug, Clone, Serialize)]
pub struct PageRankResult {
    pub scores: Vec<(String, f64)>,
    pub iterations: usize,
    pub converged: bool,
    /// L1 delta of the last iteration.
    pub final_delta: f64,
}

impl PageRankResult {
    fn empty() -> Self {
        Self {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
            final_delta: 0.0,
        }
    }

    /// Rank of `id`. Linear scan; results are small enough that no secondary
    /// index is kept.
    pub fn score(&self, id: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(node, _)| node == id)
            .map(|&(_, score)| score)
    }

    pub fn scores(&self) -> &[(String, f64)] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.scores.iter().map(|(_, score)| score).sum()
    }

    /// Highest rank first. Equal ranks keep node order.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut pairs: Vec<(&str, f64)> = self
            .scores
            .iter()
            .map(|(id, score)| (id.as_str(), *score))
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }

    pub fn top_n(&self, n: usize) -> Vec<(&str, f64)> {
        self.sorted().into_iter().take(n).collect()
    }

    pub fn max(&self) -> Option<(&str, f64)> {
        self.sorted().into_iter().next()
    }

    pub fn min(&self) -> Option<(&str, f64)> {
        self.sorted().into_iter().last()
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        self.scores.iter().cloned().collect()
    }
}

/// PageRank over a borrowed graph. Degrees and incoming-neighbour lists are
/// computed once at construction.
pub struct PageRank<'g> {
    graph: &'g Graph,
    config: PageRankConfig,
    out_degree: Vec<usize>,
    incoming: Vec<Vec<NodeIndex>>,
}

impl<'g> PageRank<'g> {
    /// PageRank with the default configuration.
    pub fn new(graph: &'g Graph) -> Self {
        Self::build(graph, PageRankConfig::default())
    }

    pub fn with_config(graph: &'g Graph, config: PageRankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(graph, config))
    }

    fn build(graph: &'g Graph, config: PageRankConfig) -> Self {
        let n = graph.node_count();
        let mut out_degree = vec![0usize; n];
        let mut incoming: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
        // last source pushed into each target's list; a source's edges are
        // contiguous, so this is enough to deduplicate
        let mut last_source: Vec<Option<NodeIndex>> = vec![None; n];

        for u in graph.indices() {
            let edges = graph.edges_at(u);
            out_degree[u.index()] = edges.len();
            for edge in edges {
                let v = edge.target().index();
                if last_source[v] != Some(u) {
                    last_source[v] = Some(u);
                    incoming[v].push(u);
                }
            }
        }

        Self {
            graph,
            config,
            out_degree,
            incoming,
        }
    }

    pub fn config(&self) -> &PageRankConfig {
        &self.config
    }

    pub fn compute(&self) -> PageRankResult {
        let n = self.graph.node_count();
        if n == 0 {
            return PageRankResult::empty();
        }

        let nf = n as f64;
        let d = self.config.damping_factor;
        let teleport = (1.0 - d) / nf;

        let mut ranks = vec![1.0 / nf; n];
        let mut next = vec![0.0_f64; n];
        let mut iterations = 0;
        let mut converged = false;
        let mut final_delta = f64::MAX;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let dangling_sum: f64 = (0..n)
                .filter(|&i| self.out_degree[i] == 0)
                .map(|i| ranks[i])
                .sum();

            let mut delta = 0.0;
            for (v, incoming) in self.incoming.iter().enumerate() {
                let link_sum: f64 = incoming
                    .iter()
                    .map(|u| ranks[u.index()] / self.out_degree[u.index()] as f64)
                    .sum();
                let rank = teleport + d * (link_sum + dangling_sum / nf);
                delta += (rank - ranks[v]).abs();
                next[v] = rank;
            }

            let total: f64 = next.iter().sum();
            if total > 0.0 {
                for rank in &mut next {
                    *rank /= total;
                }
            }

            std::mem::swap(&mut ranks, &mut next);
            final_delta = delta;
            trace!(iteration = iterations, delta, "pagerank iteration");

            if delta <= self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations, final_delta, nodes = n, "pagerank converged");
        } else {
            warn!(
                iterations,
                final_delta,
                tolerance = self.config.tolerance,
                "pagerank hit the iteration cap before converging"
            );
        }

        let scores = self
            .graph
            .nodes()
            .iter()
            .map(|node| node.id.clone())
            .zip(ranks)
            .collect();

        PageRankResult {
            scores,
            iterations,
            converged,
            final_delta,
        }
    }
}
