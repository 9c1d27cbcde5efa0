//! In-memory dependency graph over entity ids, built from `Store::get_all_dependencies`.
//! Non-code dependency types (`related`, `discovered-from`, `blocks`) are
//! skipped at construction — only structural edges participate in traversal.

pub mod path_match;
pub mod traverse;

use std::collections::HashMap;

use cx_domain::Dependency;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

pub use path_match::PatternError;

/// Direction to walk edges in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Adjacency-list dependency graph. Nodes are entity ids; edges come from
/// `code_dependency` rows only.
pub struct DependencyGraph {
    edges: HashMap<String, Vec<String>>,
    reverse_edges: HashMap<String, Vec<String>>,
    nodes: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self { edges: HashMap::new(), reverse_edges: HashMap::new(), nodes: Vec::new() }
    }

    /// Build from a flat dependency list (as returned by `Store::get_all_dependencies`).
    /// Edge insertion order is preserved per source node so traversal order stays
    /// deterministic given a stable input order; call sites should sort the input
    /// by `(from_id, to_id)` if deterministic output across runs matters.
    pub fn build(dependencies: &[Dependency]) -> Self {
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut reverse_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut node_set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();

        for dep in dependencies {
            if !dep.dep_type.is_code_dependency() {
                continue;
            }
            node_set.insert(dep.from_id.clone());
            node_set.insert(dep.to_id.clone());
            edges.entry(dep.from_id.clone()).or_default().push(dep.to_id.clone());
            reverse_edges.entry(dep.to_id.clone()).or_default().push(dep.from_id.clone());
        }

        for adj in edges.values_mut() {
            adj.sort();
            adj.dedup();
        }
        for adj in reverse_edges.values_mut() {
            adj.sort();
            adj.dedup();
        }

        let nodes: Vec<String> = node_set.into_iter().collect();
        debug!("built dependency graph with {} nodes, {} edges", nodes.len(), edges.values().map(|v| v.len()).sum::<usize>());
        Self { edges, reverse_edges, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|v| v.len()).sum()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.binary_search_by(|n| n.as_str().cmp(id)).is_ok()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.get(id).map(|v| v.len()).unwrap_or(0)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.reverse_edges.get(id).map(|v| v.len()).unwrap_or(0)
    }

    pub fn successors(&self, id: &str) -> &[String] {
        self.edges.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: &str) -> &[String] {
        self.reverse_edges.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn neighbors(&self, id: &str, direction: Direction) -> &[String] {
        match direction {
            Direction::Forward => self.successors(id),
            Direction::Reverse => self.predecessors(id),
        }
    }

    /// Builds a `petgraph::DiGraph` view of this adjacency for the
    /// traversal operations (`find_cycles`, `topological_sort`) that are
    /// naturally petgraph-shaped, the way the teacher's own dependency
    /// graph is built on `DiGraph` + `tarjan_scc`. Rebuilt on demand rather
    /// than kept in sync as a second source of truth.
    pub(crate) fn to_petgraph(&self) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            index_of.insert(node.clone(), graph.add_node(node.clone()));
        }
        for (from, tos) in &self.edges {
            let from_idx = index_of[from];
            for to in tos {
                graph.add_edge(from_idx, index_of[to], ());
            }
        }
        (graph, index_of)
    }

    /// Endpoints-only restriction to `node_set`: edges whose either endpoint
    /// falls outside the set are dropped.
    pub fn subgraph(&self, node_set: &std::collections::HashSet<String>) -> DependencyGraph {
        let mut deps = Vec::new();
        for (from, tos) in &self.edges {
            if !node_set.contains(from) {
                continue;
            }
            for to in tos {
                if node_set.contains(to) {
                    deps.push(Dependency::new(from.clone(), to.clone(), cx_domain::DepType::Calls));
                }
            }
        }
        let mut graph = DependencyGraph::build(&deps);
        // Preserve isolated nodes that survive the filter but have no edges.
        for id in node_set {
            if !graph.has_node(id) {
                graph.nodes.push(id.clone());
            }
        }
        graph.nodes.sort();
        graph.nodes.dedup();
        graph
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::DepType;

    fn dep(from: &str, to: &str, kind: DepType) -> Dependency {
        Dependency::new(from, to, kind)
    }

    #[test]
    fn build_skips_non_code_dependencies() {
        let deps = vec![dep("a", "b", DepType::Calls), dep("a", "c", DepType::Related)];
        let graph = DependencyGraph::build(&deps);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors("a"), &["b".to_string()]);
    }

    #[test]
    fn degrees_and_neighbors_are_correct() {
        let deps = vec![dep("a", "b", DepType::Calls), dep("c", "b", DepType::Calls)];
        let graph = DependencyGraph::build(&deps);
        assert_eq!(graph.in_degree("b"), 2);
        assert_eq!(graph.out_degree("a"), 1);
        assert_eq!(graph.predecessors("b"), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn subgraph_drops_edges_crossing_the_boundary() {
        let deps = vec![dep("a", "b", DepType::Calls), dep("b", "c", DepType::Calls)];
        let graph = DependencyGraph::build(&deps);
        let set: std::collections::HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let sub = graph.subgraph(&set);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
    }
}
