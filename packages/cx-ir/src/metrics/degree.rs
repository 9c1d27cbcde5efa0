//! In/out-degree: trivial counts already exposed by `DependencyGraph`,
//! gathered here into the same `entity_id -> value` shape as the other
//! metrics so callers can compute everything through one entrypoint.

use std::collections::HashMap;

use crate::graph::DependencyGraph;

pub fn in_degrees(graph: &DependencyGraph) -> HashMap<String, u32> {
    graph.nodes().iter().map(|id| (id.clone(), graph.in_degree(id) as u32)).collect()
}

pub fn out_degrees(graph: &DependencyGraph) -> HashMap<String, u32> {
    graph.nodes().iter().map(|id| (id.clone(), graph.out_degree(id) as u32)).collect()
}
