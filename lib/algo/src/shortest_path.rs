//! Single-source shortest paths: BFS (unit hops) and Dijkstra (edge weights).
//!
//! Both searches return one [`PathResult`] per graph node. Unreachable
//! targets get an empty path and [`UNREACHABLE`] as distance; the source
//! gets `[source]` at distance 0.
//!
//! Dijkstra requires non-negative weights and checks this up front. Heap
//! entries with equal distance pop in node insertion order.

use graphx_core::{Error, Graph, NodeIndex, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use tracing::debug;

/// Distance reported for targets with no path from the source.
pub const UNREACHABLE: f64 = f64::INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Every edge costs 1 (BFS).
    Hops,
    /// Edge weights are summed (Dijkstra).
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub target: String,
    /// Node ids from source to target, both inclusive. Empty when unreachable.
    pub path: Vec<String>,
    pub distance: f64,
}

impl PathResult {
    #[inline]
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of edges on the path.
    pub fn hops(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }
}

/// Paths from one source to every node of the graph, in graph node order.
#[derive(Debug, Clone, Serialize)]
pub struct ShortestPaths {
    source: String,
    metric: Metric,
    paths: Vec<PathResult>,
}

impl ShortestPaths {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn get(&self, target: &str) -> Option<&PathResult> {
        self.paths.iter().find(|p| p.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathResult> + '_ {
        self.paths.iter()
    }

    pub fn reachable(&self) -> impl Iterator<Item = &PathResult> + '_ {
        self.paths.iter().filter(|p| p.has_path())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, PathResult> {
        self.paths
            .into_iter()
            .map(|p| (p.target.clone(), p))
            .collect()
    }
}

impl IntoIterator for ShortestPaths {
    type Item = PathResult;
    type IntoIter = std::vec::IntoIter<PathResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Shortest-path searches over a borrowed graph.
pub struct ShortestPath<'g> {
    graph: &'g Graph,
}

impl<'g> ShortestPath<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Unit-hop distances by FIFO traversal. The first visit of a node fixes
    /// its predecessor.
    pub fn bfs(&self, source: &str) -> Result<ShortestPaths> {
        let src = self.source_index(source)?;
        let n = self.graph.node_count();
        let mut distance = vec![UNREACHABLE; n];
        let mut predecessor: Vec<Option<NodeIndex>> = vec![None; n];
        let mut queue = VecDeque::new();

        distance[src.index()] = 0.0;
        queue.push_back(src);

        while let Some(current) = queue.pop_front() {
            let next = distance[current.index()] + 1.0;
            for neighbor in self.graph.neighbor_indices(current) {
                if distance[neighbor.index()] == UNREACHABLE {
                    distance[neighbor.index()] = next;
                    predecessor[neighbor.index()] = Some(current);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(self.collect(src, Metric::Hops, &distance, &predecessor))
    }

    /// Weighted distances by priority-queue relaxation. A predecessor is only
    /// replaced on a strictly shorter distance.
    pub fn dijkstra(&self, source: &str) -> Result<ShortestPaths> {
        let src = self.source_index(source)?;
        self.check_weights()?;

        let n = self.graph.node_count();
        let mut distance = vec![UNREACHABLE; n];
        let mut predecessor: Vec<Option<NodeIndex>> = vec![None; n];
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeIndex)>> = BinaryHeap::new();

        distance[src.index()] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), src)));

        while let Some(Reverse((OrderedFloat(dist), current))) = heap.pop() {
            // stale entry, a shorter distance was already settled
            if dist > distance[current.index()] {
                continue;
            }
            for edge in self.graph.edges_at(current) {
                let target = edge.target();
                let candidate = dist + edge.weight();
                if candidate < distance[target.index()] {
                    distance[target.index()] = candidate;
                    predecessor[target.index()] = Some(current);
                    heap.push(Reverse((OrderedFloat(candidate), target)));
                }
            }
        }

        Ok(self.collect(src, Metric::Weighted, &distance, &predecessor))
    }

    /// Path from `source` to a single `target`.
    pub fn path_between(&self, source: &str, target: &str, metric: Metric) -> Result<PathResult> {
        if !self.graph.contains_node(target) {
            return Err(Error::NodeNotFound(target.to_string()));
        }
        let paths = match metric {
            Metric::Hops => self.bfs(source)?,
            Metric::Weighted => self.dijkstra(source)?,
        };
        paths
            .into_iter()
            .find(|p| p.target == target)
            .ok_or_else(|| Error::NodeNotFound(target.to_string()))
    }

    fn source_index(&self, source: &str) -> Result<NodeIndex> {
        self.graph
            .index_of(source)
            .ok_or_else(|| Error::NodeNotFound(source.to_string()))
    }

    fn check_weights(&self) -> Result<()> {
        for edge in self.graph.edges() {
            let weight = edge.weight();
            if weight < 0.0 || weight.is_nan() {
                return Err(Error::NegativeWeight {
                    from: self.graph.node(edge.source()).id.clone(),
                    to: self.graph.node(edge.target()).id.clone(),
                    weight,
                });
            }
        }
        Ok(())
    }

    fn collect(
        &self,
        src: NodeIndex,
        metric: Metric,
        distance: &[f64],
        predecessor: &[Option<NodeIndex>],
    ) -> ShortestPaths {
        let paths: Vec<PathResult> = self
            .graph
            .indices()
            .map(|target| self.reconstruct(src, target, distance, predecessor))
            .collect();

        debug!(
            source = %self.graph.node(src).id,
            ?metric,
            reachable = paths.iter().filter(|p| p.has_path()).count(),
            nodes = paths.len(),
            "shortest paths computed"
        );

        ShortestPaths {
            source: self.graph.node(src).id.clone(),
            metric,
            paths,
        }
    }

    fn reconstruct(
        &self,
        src: NodeIndex,
        target: NodeIndex,
        distance: &[f64],
        predecessor: &[Option<NodeIndex>],
    ) -> PathResult {
        let id = self.graph.node(target).id.clone();
        if target != src && predecessor[target.index()].is_none() {
            return PathResult {
                target: id,
                path: Vec::new(),
                distance: UNREACHABLE,
            };
        }

        let mut chain = vec![target];
        let mut current = target;
        while current != src {
            current = match predecessor[current.index()] {
                Some(previous) => previous,
                None => unreachable!("predecessor chain of {id} ends before the source"),
            };
            chain.push(current);
        }

        PathResult {
            target: id,
            path: chain
                .into_iter()
                .rev()
                .map(|idx| self.graph.node(idx).id.clone())
                .collect(),
            distance: distance[target.index()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted(directed: bool, edges: &[(&str, &str, f64)]) -> Graph {
        let mut graph = Graph::new(directed, true);
        for &(a, b, w) in edges {
            graph.add_edge(a, b, w);
        }
        graph
    }

    fn ids(path: &PathResult) -> Vec<&str> {
        path.path.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_bfs_counts_hops() {
        let graph = weighted(false, &[("A", "B", 5.0), ("B", "C", 5.0), ("A", "D", 1.0)]);
        let paths = ShortestPath::new(&graph).bfs("A").unwrap();

        assert_eq!(paths.len(), 4);
        assert_eq!(paths.get("C").unwrap().distance, 2.0);
        assert_eq!(ids(paths.get("C").unwrap()), vec!["A", "B", "C"]);
        assert_eq!(paths.get("D").unwrap().hops(), Some(1));
    }

    #[test]
    fn test_source_to_itself() {
        let graph = weighted(true, &[("A", "B", 2.0)]);
        let sp = ShortestPath::new(&graph);
        for paths in [sp.bfs("A").unwrap(), sp.dijkstra("A").unwrap()] {
            let own = paths.get("A").unwrap();
            assert_eq!(own.distance, 0.0);
            assert_eq!(ids(own), vec!["A"]);
            assert!(own.has_path());
        }
    }

    #[test]
    fn test_unreachable_target() {
        let mut graph = weighted(true, &[("A", "B", 1.0)]);
        graph.add_node("island");
        let sp = ShortestPath::new(&graph);

        for paths in [sp.bfs("A").unwrap(), sp.dijkstra("A").unwrap()] {
            let island = paths.get("island").unwrap();
            assert!(!island.has_path());
            assert_eq!(island.distance, UNREACHABLE);
            assert_eq!(island.hops(), None);
        }
    }

    #[test]
    fn test_directed_edges_are_one_way() {
        let graph = weighted(true, &[("A", "B", 1.0)]);
        let paths = ShortestPath::new(&graph).bfs("B").unwrap();
        assert!(!paths.get("A").unwrap().has_path());
        assert_eq!(paths.reachable().count(), 1);
    }

    #[test]
    fn test_missing_source_is_error() {
        let graph = weighted(false, &[("A", "B", 1.0)]);
        let sp = ShortestPath::new(&graph);
        assert!(matches!(sp.bfs("Z"), Err(Error::NodeNotFound(id)) if id == "Z"));
        assert!(matches!(sp.dijkstra("Z"), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_dijkstra_prefers_lighter_route() {
        let graph = weighted(
            true,
            &[("A", "B", 10.0), ("A", "C", 1.0), ("C", "D", 1.0), ("D", "B", 1.0)],
        );
        let paths = ShortestPath::new(&graph).dijkstra("A").unwrap();
        let b = paths.get("B").unwrap();
        assert_eq!(b.distance, 3.0);
        assert_eq!(ids(b), vec!["A", "C", "D", "B"]);

        let hops = ShortestPath::new(&graph).bfs("A").unwrap();
        assert_eq!(ids(hops.get("B").unwrap()), vec!["A", "B"]);
    }

    #[test]
    fn test_dijkstra_distance_matches_path_weight() {
        let graph = weighted(
            false,
            &[("A", "B", 2.5), ("B", "C", 0.5), ("A", "C", 4.0), ("C", "D", 1.25)],
        );
        let paths = ShortestPath::new(&graph).dijkstra("A").unwrap();
        for result in paths.reachable() {
            let walked: f64 = result
                .path
                .windows(2)
                .map(|pair| {
                    graph
                        .edges_from(&pair[0])
                        .iter()
                        .filter(|e| graph.node(e.target()).id == pair[1])
                        .map(|e| e.weight())
                        .fold(f64::INFINITY, f64::min)
                })
                .sum();
            assert!((walked - result.distance).abs() < 1e-12, "{}", result.target);
        }
    }

    #[test]
    fn test_equal_distance_tie_prefers_earlier_node() {
        // two equal routes to D; B was inserted before C
        let graph = weighted(
            true,
            &[("A", "B", 1.0), ("A", "C", 1.0), ("B", "D", 1.0), ("C", "D", 1.0)],
        );
        let sp = ShortestPath::new(&graph);
        for _ in 0..5 {
            let d = sp.dijkstra("A").unwrap();
            assert_eq!(ids(d.get("D").unwrap()), vec!["A", "B", "D"]);
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let graph = weighted(true, &[("A", "B", -1.0)]);
        let err = ShortestPath::new(&graph).dijkstra("A").unwrap_err();
        assert!(matches!(err, Error::NegativeWeight { weight, .. } if weight == -1.0));
    }

    #[test]
    fn test_path_between() {
        let graph = weighted(false, &[("A", "B", 1.0), ("B", "C", 1.0)]);
        let sp = ShortestPath::new(&graph);
        let path = sp.path_between("A", "C", Metric::Weighted).unwrap();
        assert_eq!(path.distance, 2.0);
        assert!(sp.path_between("A", "Z", Metric::Hops).is_err());
    }
}
