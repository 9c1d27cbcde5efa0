//! Graph metrics orchestrator: runs pagerank, degree, and betweenness over a
//! `DependencyGraph` and packages the results as one `cx_domain::Metrics` per
//! node, ready for `Importance::classify` or storage via `Store::save_metrics`.

pub mod betweenness;
pub mod degree;
pub mod pagerank;

use std::collections::HashMap;

use chrono::Utc;
use cx_domain::Metrics;
use tracing::info;

use crate::config::CxConfig;
use crate::graph::DependencyGraph;

/// Computes all metrics for every node in `graph`, keyed by entity id.
pub fn compute_all(graph: &DependencyGraph, config: &CxConfig) -> HashMap<String, Metrics> {
    let pagerank_scores = pagerank::compute(graph, &config.pagerank);
    let in_degrees = degree::in_degrees(graph);
    let out_degrees = degree::out_degrees(graph);
    let betweenness_scores = betweenness::compute(graph, &config.betweenness);
    let computed_at = Utc::now();
    info!("computed metrics for {} nodes", graph.node_count());

    graph
        .nodes()
        .iter()
        .map(|id| {
            let metrics = Metrics {
                entity_id: id.clone(),
                pagerank: pagerank_scores.get(id).copied().unwrap_or(0.0),
                in_degree: in_degrees.get(id).copied().unwrap_or(0),
                out_degree: out_degrees.get(id).copied().unwrap_or(0),
                betweenness: betweenness_scores.get(id).copied().unwrap_or(0.0),
                computed_at,
            };
            (id.clone(), metrics)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::{DepType, Dependency, Importance};

    #[test]
    fn hub_with_many_callers_classifies_as_bottleneck_or_keystone() {
        let mut deps = Vec::new();
        for i in 0..12 {
            deps.push(Dependency::new(format!("caller{i}"), "hub", DepType::Calls));
        }
        let graph = DependencyGraph::build(&deps);
        let config = CxConfig::default();
        let all = compute_all(&graph, &config);

        let hub_metrics = &all["hub"];
        assert_eq!(hub_metrics.in_degree, 12);
        let importance = Importance::classify(hub_metrics);
        assert!(matches!(importance, Importance::Keystone | Importance::Bottleneck));
    }

    #[test]
    fn entry_point_with_no_callers_classifies_as_leaf() {
        // PageRank sums to ~1.0 across all nodes, so a tiny graph leaves
        // every node above the 0.01 keystone threshold regardless of
        // degree. A long chain spreads the mass thin enough that the
        // entry point's degree-based classification actually shows through.
        let mut deps = Vec::new();
        for i in 0..200 {
            deps.push(Dependency::new(format!("n{i}"), format!("n{}", i + 1), DepType::Calls));
        }
        let graph = DependencyGraph::build(&deps);
        let config = CxConfig::default();
        let all = compute_all(&graph, &config);

        assert_eq!(all["n0"].in_degree, 0);
        assert_eq!(Importance::classify(&all["n0"]), Importance::Leaf);
    }
}
