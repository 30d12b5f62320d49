//! Community detection by greedy modularity optimisation.
//!
//! This is the local-moving phase of Louvain, run at a single level (the
//! graph is never contracted). Every node starts in its own community. Each
//! pass visits the nodes in a shuffled order and moves a node to whichever
//! option has the largest positive modularity gain:
//!
//! ```text
//! ΔQ(C) = k_in(C) / m  -  Σtot(C) · k_i / (2 m²)
//! ```
//!
//! - `k_in(C)`: weight of the node's outgoing edges into `C`
//! - `Σtot(C)`: summed node weight of `C`, the moving node excluded
//! - `k_i`: the node's own weight (sum of its outgoing edge weights)
//! - `m`: total stored edge weight of the graph
//!
//! The options are staying, joining a neighbouring community, or leaving
//! for a fresh singleton community (`ΔQ = -ΔQ(stay) - k_i² / (2 m²)`).
//! Neighbouring communities are tried in ascending id order and a candidate
//! only wins with a strictly larger gain, so ties go to the lowest id.
//!
//! Passes repeat until one makes no move, the modularity gain between passes
//! drops below `min_modularity_gain`, or `max_passes` is reached. The visit
//! order is the only source of randomness; fix it with
//! [`CommunityConfig::with_seed`] or pass an RNG to
//! [`CommunityDetection::detect_with_rng`].
//!
//! # Example
//!
//! ```rust
//! use graphx_algo::{CommunityConfig, CommunityDetection};
//! use graphx_core::Graph;
//!
//! let mut graph = Graph::default();
//! graph.add_default_edge("A", "B");
//! graph.add_default_edge("C", "D");
//!
//! let config = CommunityConfig::new().with_seed(7);
//! let detection = CommunityDetection::with_config(&graph, config).unwrap();
//! let result = detection.detect();
//! assert_eq!(result.num_communities(), 2);
//! assert!((result.modularity - 0.5).abs() < 1e-12);
//! ```

use ahash::AHashMap;
use graphx_core::{Error, Graph, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

pub type CommunityId = u64;

/// Configuration for community detection.
#[derive(Debug, Clone)]
pub struct CommunityConfig {
    /// Maximum number of local-moving passes.
    /// Default: 100
    pub max_passes: usize,

    /// Stop once a pass improves modularity by less than this.
    /// Default: 1e-6
    pub min_modularity_gain: f64,

    /// Seed for the node visit order. `None` draws from the thread RNG.
    /// Default: None
    pub seed: Option<u64>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            max_passes: 100,
            min_modularity_gain: 1e-6,
            seed: None,
        }
    }
}

impl CommunityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub const fn with_min_modularity_gain(mut self, min_modularity_gain: f64) -> Self {
        self.min_modularity_gain = min_modularity_gain;
        self
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(Error::InvalidConfig(
                "max_passes must be at least 1".to_string(),
            ));
        }
        if !self.min_modularity_gain.is_finite() || self.min_modularity_gain < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_modularity_gain must be a non-negative finite number, got {}",
                self.min_modularity_gain
            )));
        }
        Ok(())
    }
}

/// Final partition. Community ids are renumbered `0..k` in node order.
#[derive(Debug, Clone, Serialize)]
pub struct CommunityResult {
    /// `(node id, community id)` in graph node order.
    pub assignments: Vec<(String, CommunityId)>,
    pub modularity: f64,
    pub passes: usize,
    /// Node moves summed over all passes.
    pub moves: usize,
    pub converged: bool,
}

impl CommunityResult {
    pub fn community_of(&self, id: &str) -> Option<CommunityId> {
        self.assignments
            .iter()
            .find(|(node, _)| node == id)
            .map(|&(_, community)| community)
    }

    /// Members of `community` in node order.
    pub fn members(&self, community: CommunityId) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|&&(_, c)| c == community)
            .map(|(node, _)| node.as_str())
            .collect()
    }

    /// Community id to member ids, built from the assignments on each call.
    pub fn communities(&self) -> BTreeMap<CommunityId, Vec<String>> {
        let mut map: BTreeMap<CommunityId, Vec<String>> = BTreeMap::new();
        for (node, community) in &self.assignments {
            map.entry(*community).or_default().push(node.clone());
        }
        map
    }

    pub fn community_sets(&self) -> Vec<BTreeSet<String>> {
        self.communities()
            .into_values()
            .map(|members| members.into_iter().collect())
            .collect()
    }

    pub fn node_to_community(&self) -> HashMap<String, CommunityId> {
        self.assignments.iter().cloned().collect()
    }

    pub fn num_communities(&self) -> usize {
        self.assignments
            .iter()
            .map(|&(_, c)| c)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn same_community(&self, a: &str, b: &str) -> bool {
        match (self.community_of(a), self.community_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Largest community and its size; the lowest id wins a size tie.
    pub fn largest_community(&self) -> Option<(CommunityId, usize)> {
        self.communities()
            .into_iter()
            .map(|(id, members)| (id, members.len()))
            .fold(None, |best, (id, size)| match best {
                Some((_, best_size)) if best_size >= size => best,
                _ => Some((id, size)),
            })
    }
}

/// Working state of one detection run.
struct Partition {
    community: Vec<CommunityId>,
    totals: AHashMap<CommunityId, f64>,
    /// Per node: connection weight into each community looked up so far.
    /// Entries are exact whenever present.
    cache: Vec<AHashMap<CommunityId, f64>>,
    next_id: CommunityId,
}

impl Partition {
    fn singletons(node_weight: &[f64]) -> Self {
        let n = node_weight.len();
        Self {
            community: (0..n as CommunityId).collect(),
            totals: node_weight
                .iter()
                .enumerate()
                .map(|(i, &w)| (i as CommunityId, w))
                .collect(),
            cache: vec![AHashMap::new(); n],
            next_id: n as CommunityId,
        }
    }

    #[inline]
    fn total(&self, community: CommunityId) -> f64 {
        self.totals.get(&community).copied().unwrap_or(0.0)
    }

    fn add_to_total(&mut self, community: CommunityId, weight: f64) {
        *self.totals.entry(community).or_insert(0.0) += weight;
    }

    fn fresh_id(&mut self) -> CommunityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn connection(&mut self, links: &[(usize, f64)], node: usize, community: CommunityId) -> f64 {
        if let Some(&weight) = self.cache[node].get(&community) {
            return weight;
        }
        let weight = direct_connection(links, &self.community, community);
        self.cache[node].insert(community, weight);
        weight
    }
}

fn direct_connection(
    links: &[(usize, f64)],
    assignment: &[CommunityId],
    community: CommunityId,
) -> f64 {
    links
        .iter()
        .filter(|&&(j, _)| assignment[j] == community)
        .map(|&(_, w)| w)
        .sum()
}

#[inline]
fn delta_q(k_in: f64, sigma_tot: f64, k_i: f64, m: f64) -> f64 {
    k_in / m - (sigma_tot * k_i) / (2.0 * m * m)
}

struct Outcome {
    partition: Partition,
    modularity: f64,
    passes: usize,
    moves: usize,
    converged: bool,
}

/// Single-level modularity optimisation over a borrowed graph.
pub struct CommunityDetection<'g> {
    graph: &'g Graph,
    config: CommunityConfig,
    /// Sum of outgoing edge weights per node.
    node_weight: Vec<f64>,
    /// Outgoing links with parallel records merged: `(target, weight)`.
    links: Vec<Vec<(usize, f64)>>,
    /// Incoming links with parallel records merged: `(source, weight)`.
    in_links: Vec<Vec<(usize, f64)>>,
    total_weight: f64,
}

impl<'g> CommunityDetection<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self::build(graph, CommunityConfig::default())
    }

    pub fn with_config(graph: &'g Graph, config: CommunityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(graph, config))
    }

    fn build(graph: &'g Graph, config: CommunityConfig) -> Self {
        let n = graph.node_count();
        let mut node_weight = vec![0.0_f64; n];
        let mut links: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
        let mut in_links: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];

        for u in graph.indices() {
            let mut merged: Vec<(usize, f64)> = Vec::new();
            let mut slot: AHashMap<usize, usize> = AHashMap::new();
            for edge in graph.edges_at(u) {
                let v = edge.target().index();
                node_weight[u.index()] += edge.weight();
                match slot.get(&v) {
                    Some(&pos) => merged[pos].1 += edge.weight(),
                    None => {
                        slot.insert(v, merged.len());
                        merged.push((v, edge.weight()));
                    }
                }
            }
            for &(v, w) in &merged {
                in_links[v].push((u.index(), w));
            }
            links.push(merged);
        }

        Self {
            graph,
            config,
            node_weight,
            links,
            in_links,
            total_weight: graph.total_edge_weight(),
        }
    }

    pub fn config(&self) -> &CommunityConfig {
        &self.config
    }

    /// Weight of a node: the sum of its outgoing edge weights. 0.0 when absent.
    pub fn node_weight(&self, id: &str) -> f64 {
        self.graph
            .index_of(id)
            .map(|idx| self.node_weight[idx.index()])
            .unwrap_or(0.0)
    }

    /// Summed weight of every `source -> target` record.
    pub fn edge_weight(&self, source: &str, target: &str) -> f64 {
        match (self.graph.index_of(source), self.graph.index_of(target)) {
            (Some(s), Some(t)) => self.links[s.index()]
                .iter()
                .filter(|&&(j, _)| j == t.index())
                .map(|&(_, w)| w)
                .sum(),
            _ => 0.0,
        }
    }

    /// Weight of `id`'s outgoing edges into `community` under `result`,
    /// computed directly from the adjacency.
    pub fn connection_weight(
        &self,
        result: &CommunityResult,
        id: &str,
        community: CommunityId,
    ) -> f64 {
        let Some(idx) = self.graph.index_of(id) else {
            return 0.0;
        };
        let assignment: Vec<CommunityId> = result.assignments.iter().map(|&(_, c)| c).collect();
        direct_connection(&self.links[idx.index()], &assignment, community)
    }

    /// Run with the configured seed, or the thread RNG when unseeded.
    pub fn detect(&self) -> CommunityResult {
        match self.config.seed {
            Some(seed) => self.detect_with_rng(&mut StdRng::seed_from_u64(seed)),
            None => self.detect_with_rng(&mut rand::rng()),
        }
    }

    /// Run with a caller-supplied random source for the visit order.
    pub fn detect_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> CommunityResult {
        let outcome = self.optimise(rng);
        self.finish(outcome)
    }

    fn optimise<R: Rng + ?Sized>(&self, rng: &mut R) -> Outcome {
        let n = self.graph.node_count();
        let m = self.total_weight;
        let mut partition = Partition::singletons(&self.node_weight);

        if n == 0 || m <= 0.0 {
            debug!(nodes = n, total_weight = m, "degenerate graph, skipping community detection");
            return Outcome {
                partition,
                modularity: 0.0,
                passes: 0,
                moves: 0,
                converged: true,
            };
        }

        let mut order: Vec<usize> = (0..n).collect();
        let mut previous = f64::NEG_INFINITY;
        let mut passes = 0;
        let mut total_moves = 0;
        let mut converged = false;

        let modularity = loop {
            passes += 1;
            order.shuffle(rng);

            let mut moves = 0;
            for &node in &order {
                if self.move_node(node, &mut partition, m) {
                    moves += 1;
                }
            }
            total_moves += moves;

            let q = self.modularity(&partition.community, m);
            debug!(pass = passes, moves, modularity = q, "community pass");

            if moves == 0 || q - previous < self.config.min_modularity_gain {
                converged = true;
                break q;
            }
            if passes >= self.config.max_passes {
                warn!(passes, modularity = q, "community detection hit the pass cap");
                break q;
            }
            previous = q;
        };

        Outcome {
            partition,
            modularity,
            passes,
            moves: total_moves,
            converged,
        }
    }

    /// Evaluate every option for `node` and apply the best one. Returns
    /// whether the node changed community.
    fn move_node(&self, node: usize, partition: &mut Partition, m: f64) -> bool {
        let current = partition.community[node];
        let k_i = self.node_weight[node];
        let links = &self.links[node];

        partition.add_to_total(current, -k_i);

        let stay_gain = delta_q(
            partition.connection(links, node, current),
            partition.total(current),
            k_i,
            m,
        );

        let mut candidates: Vec<CommunityId> = links
            .iter()
            .map(|&(j, _)| partition.community[j])
            .filter(|&c| c != current)
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut best = current;
        let mut best_gain = stay_gain;
        for community in candidates {
            let gain = delta_q(
                partition.connection(links, node, community),
                partition.total(community),
                k_i,
                m,
            );
            if gain > best_gain {
                best = community;
                best_gain = gain;
            }
        }

        let isolation_gain = -stay_gain - (k_i * k_i) / (2.0 * m * m);
        let isolate = isolation_gain > best_gain;
        if isolate {
            best_gain = isolation_gain;
        }

        if best_gain > 0.0 && (isolate || best != current) {
            let target = if isolate { partition.fresh_id() } else { best };
            partition.add_to_total(target, k_i);
            partition.community[node] = target;
            self.patch_cache(node, current, target, partition);
            true
        } else {
            partition.add_to_total(current, k_i);
            false
        }
    }

    /// Shift `node`'s contribution from `from` to `to` in the cached
    /// connection weights of every node linking into it. Missing entries are
    /// left missing and computed on demand.
    fn patch_cache(
        &self,
        node: usize,
        from: CommunityId,
        to: CommunityId,
        partition: &mut Partition,
    ) {
        for &(source, weight) in &self.in_links[node] {
            let cache = &mut partition.cache[source];
            if let Some(old) = cache.get_mut(&from) {
                *old -= weight;
            }
            if let Some(new) = cache.get_mut(&to) {
                *new += weight;
            }
        }
    }

    /// Newman modularity over stored records:
    /// `Q = Σ_c [ in_c / m - (tot_c / m)² ]`.
    fn modularity(&self, assignment: &[CommunityId], m: f64) -> f64 {
        if m <= 0.0 {
            return 0.0;
        }
        // (internal weight, total weight), summed in ascending id order
        let mut per_community: BTreeMap<CommunityId, (f64, f64)> = BTreeMap::new();
        for (u, links) in self.links.iter().enumerate() {
            let c = assignment[u];
            let internal: f64 = links
                .iter()
                .filter(|&&(v, _)| assignment[v] == c)
                .map(|&(_, w)| w)
                .sum();
            let entry = per_community.entry(c).or_insert((0.0, 0.0));
            entry.0 += internal;
            entry.1 += self.node_weight[u];
        }
        per_community
            .values()
            .map(|&(internal, tot)| internal / m - (tot / m) * (tot / m))
            .sum()
    }

    fn finish(&self, outcome: Outcome) -> CommunityResult {
        let mut renumber: AHashMap<CommunityId, CommunityId> = AHashMap::new();
        let assignments: Vec<(String, CommunityId)> = self
            .graph
            .nodes()
            .iter()
            .zip(&outcome.partition.community)
            .map(|(node, &raw)| {
                let next = renumber.len() as CommunityId;
                let id = *renumber.entry(raw).or_insert(next);
                (node.id.clone(), id)
            })
            .collect();

        debug!(
            communities = renumber.len(),
            modularity = outcome.modularity,
            passes = outcome.passes,
            moves = outcome.moves,
            "community detection finished"
        );

        CommunityResult {
            assignments,
            modularity: outcome.modularity,
            passes: outcome.passes,
            moves: outcome.moves,
            converged: outcome.converged,
        }
    }
}
