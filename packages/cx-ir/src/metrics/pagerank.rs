//! Standard damped power-iteration PageRank over entity ids. Scores sum to
//! ~1.0 across the graph (not normalized to the max score), since
//! importance classification compares against an absolute threshold.

use std::collections::HashMap;

use tracing::debug;

use crate::config::PageRankConfig;
use crate::graph::{DependencyGraph, Direction};

pub fn compute(graph: &DependencyGraph, config: &PageRankConfig) -> HashMap<String, f64> {
    let n = graph.node_count();
    if n == 0 {
        return HashMap::new();
    }
    let n_f = n as f64;
    let nodes = graph.nodes();

    let mut scores: HashMap<&str, f64> =
        nodes.iter().map(|id| (id.as_str(), 1.0 / n_f)).collect();
    let out_degree: HashMap<&str, usize> =
        nodes.iter().map(|id| (id.as_str(), graph.out_degree(id))).collect();

    for iteration in 0..config.max_iterations {
        let dangling_sum: f64 = nodes
            .iter()
            .filter(|id| out_degree[id.as_str()] == 0)
            .map(|id| scores[id.as_str()])
            .sum();

        let mut next: HashMap<&str, f64> = HashMap::with_capacity(n);
        let mut max_diff: f64 = 0.0;

        for id in nodes {
            let mut score = (1.0 - config.damping) / n_f + config.damping * dangling_sum / n_f;
            for source in graph.neighbors(id, Direction::Reverse) {
                let source_out = out_degree[source.as_str()] as f64;
                if source_out > 0.0 {
                    score += config.damping * scores[source.as_str()] / source_out;
                }
            }
            max_diff = max_diff.max((score - scores[id.as_str()]).abs());
            next.insert(id.as_str(), score);
        }

        scores = next;
        if max_diff < config.tolerance {
            debug!("PageRank converged in {} iterations", iteration + 1);
            break;
        }
    }

    scores.into_iter().map(|(id, score)| (id.to_string(), score)).collect()
}
