//! Betweenness centrality via Brandes' algorithm (unweighted, directed).
//! Exact for graphs under the configured node threshold; above it, a
//! sampled approximation that runs the same single-source accumulation
//! from a deterministic subset of pivots and rescales the result.

use std::collections::{HashMap, VecDeque};

use crate::config::BetweennessConfig;
use crate::graph::DependencyGraph;

pub fn compute(graph: &DependencyGraph, config: &BetweennessConfig) -> HashMap<String, f64> {
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return HashMap::new();
    }

    if nodes.len() <= config.exact_node_threshold {
        exact(graph, nodes, nodes)
    } else {
        let sample_size = config.approx_sample_size.min(nodes.len());
        let stride = (nodes.len() as f64 / sample_size as f64).max(1.0);
        let pivots: Vec<String> =
            (0..sample_size).map(|i| nodes[((i as f64 * stride) as usize).min(nodes.len() - 1)].clone()).collect();
        let mut scores = exact(graph, nodes, &pivots);
        let scale = nodes.len() as f64 / sample_size as f64;
        for value in scores.values_mut() {
            *value *= scale;
        }
        scores
    }
}

/// Accumulates Brandes' single-source dependency from every id in `sources`,
/// over the full node set `nodes`.
fn exact(graph: &DependencyGraph, nodes: &[String], sources: &[String]) -> HashMap<String, f64> {
    let mut betweenness: HashMap<String, f64> = nodes.iter().map(|id| (id.clone(), 0.0)).collect();

    for s in sources {
        let mut sigma: HashMap<&str, f64> = HashMap::new();
        let mut dist: HashMap<&str, i64> = HashMap::new();
        let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut stack = Vec::new();
        let mut queue = VecDeque::new();

        sigma.insert(s.as_str(), 1.0);
        dist.insert(s.as_str(), 0);
        queue.push_back(s.as_str());

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in graph.successors(v) {
                let w = w.as_str();
                if !dist.contains_key(w) {
                    dist.insert(w, dist[v] + 1);
                    queue.push_back(w);
                }
                if dist.get(w) == Some(&(dist[v] + 1)) {
                    *sigma.entry(w).or_insert(0.0) += sigma[v];
                    preds.entry(w).or_default().push(v);
                }
            }
        }

        let mut delta: HashMap<&str, f64> = HashMap::new();
        while let Some(w) = stack.pop() {
            let coeff = (1.0 + *delta.get(w).unwrap_or(&0.0)) / sigma[w];
            for &v in preds.get(w).map(|p| p.as_slice()).unwrap_or(&[]) {
                *delta.entry(v).or_insert(0.0) += sigma[v] * coeff;
            }
            if w != s.as_str() {
                *betweenness.get_mut(w).unwrap() += *delta.get(w).unwrap_or(&0.0);
            }
        }
    }

    betweenness
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::{DepType, Dependency};

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let deps = edges.iter().map(|(a, b)| Dependency::new(*a, *b, DepType::Calls)).collect::<Vec<_>>();
        DependencyGraph::build(&deps)
    }

    #[test]
    fn bridge_node_has_higher_betweenness_than_endpoints() {
        let g = graph(&[("a", "bridge"), ("bridge", "c")]);
        let scores = compute(&g, &BetweennessConfig::default());
        assert!(scores["bridge"] > scores["a"]);
        assert!(scores["bridge"] > scores["c"]);
    }

    #[test]
    fn symmetric_cycle_distributes_betweenness_evenly() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let scores = compute(&g, &BetweennessConfig::default());
        let values: Vec<f64> = scores.values().copied().collect();
        let first = values[0];
        assert!(values.iter().all(|v| (*v - first).abs() < 1e-9));
    }

    #[test]
    fn approximation_scales_toward_exact_order_of_magnitude() {
        let mut edges = Vec::new();
        for i in 0..20 {
            edges.push((format!("n{i}"), "hub".to_string()));
            edges.push(("hub".to_string(), format!("m{i}")));
        }
        let edge_refs: Vec<(&str, &str)> = edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let g = graph(&edge_refs);

        let exact_config = BetweennessConfig { exact_node_threshold: 10_000, approx_sample_size: 5 };
        let approx_config = BetweennessConfig { exact_node_threshold: 1, approx_sample_size: 5 };

        let exact_scores = compute(&g, &exact_config);
        let approx_scores = compute(&g, &approx_config);

        assert!(exact_scores["hub"] > 0.0);
        assert!(approx_scores["hub"] > 0.0);
    }
}
