//! JSON envelopes handed back to callers of the analytics.
//!
//! Each function reshapes one algorithm result into the flat mappings the
//! service layer consumes. Non-finite numbers serialise as `null`.

use graphx_algo::{CommunityResult, PageRankResult, ShortestPaths};
use graphx_similarity::SimilarityPair;
use serde_json::{json, Map, Value};

/// `{"communities": {node_id: community_id}, "modularity": q}`
pub fn communities(result: &CommunityResult) -> Value {
    let assignments: Map<String, Value> = result
        .assignments
        .iter()
        .map(|(id, community)| (id.clone(), json!(community)))
        .collect();
    json!({
        "communities": assignments,
        "modularity": number(result.modularity),
    })
}

/// `{node_id: rank}`
pub fn pagerank(result: &PageRankResult) -> Value {
    Value::Object(
        result
            .scores()
            .iter()
            .map(|(id, rank)| (id.clone(), number(*rank)))
            .collect(),
    )
}

/// `{"a,b": score}`
pub fn jaccard(pairs: &[SimilarityPair]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|pair| (pair.key(), number(pair.score)))
            .collect(),
    )
}

/// `{target_id: {"path": [...], "distance": d, "reachable": bool}}`
pub fn paths(paths: &ShortestPaths) -> Value {
    Value::Object(
        paths
            .iter()
            .map(|result| {
                let entry = json!({
                    "path": result.path,
                    "distance": number(result.distance),
                    "reachable": result.has_path(),
                });
                (result.target.clone(), entry)
            })
            .collect(),
    )
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphx_algo::{CommunityConfig, CommunityDetection, PageRank, ShortestPath};
    use graphx_core::Graph;
    use graphx_similarity::JaccardSimilarity;

    fn pairs_graph() -> Graph {
        let mut graph = Graph::default();
        graph.add_default_edge("A", "B");
        graph.add_default_edge("C", "D");
        graph
    }

    #[test]
    fn test_communities_envelope() {
        let graph = pairs_graph();
        let result = CommunityDetection::with_config(&graph, CommunityConfig::new().with_seed(1))
            .unwrap()
            .detect();
        let value = communities(&result);

        assert_eq!(value["communities"]["A"], value["communities"]["B"]);
        assert_ne!(value["communities"]["A"], value["communities"]["C"]);
        assert!((value["modularity"].as_f64().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pagerank_envelope() {
        let graph = pairs_graph();
        let value = pagerank(&PageRank::new(&graph).compute());
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        let total: f64 = object.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_envelope() {
        let mut graph = Graph::default();
        graph.add_default_edge("alice", "carol");
        graph.add_default_edge("bob", "carol");
        graph.add_default_edge("bob", "dave");
        let value = jaccard(&JaccardSimilarity::new(&graph).pairs(true));

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(value["alice,bob"].as_f64(), Some(0.5));
        assert_eq!(value["carol,dave"].as_f64(), Some(0.5));
        assert!(value.get("alice,dave").is_none());
    }

    #[test]
    fn test_unreachable_distance_is_null() {
        let graph = pairs_graph();
        let value = paths(&ShortestPath::new(&graph).bfs("A").unwrap());

        assert_eq!(value["B"]["distance"].as_f64(), Some(1.0));
        assert_eq!(value["B"]["reachable"], Value::Bool(true));
        assert_eq!(value["C"]["distance"], Value::Null);
        assert_eq!(value["C"]["reachable"], Value::Bool(false));
        assert_eq!(value["C"]["path"], json!([]));
    }
}
