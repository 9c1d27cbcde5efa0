//! Traversal primitives: BFS/DFS, transitive closure, shortest path, cycle
//! detection, topological sort, bounded simple-path enumeration, and the
//! caller/callee convenience views built on top of them.

use std::collections::{HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::Direction as PetDirection;

use super::{Direction, DependencyGraph};

impl DependencyGraph {
    /// Level-ordered visit sequence starting with `start`. Disconnected
    /// nodes are never visited. Neighbor order is the sorted adjacency list,
    /// so results are deterministic.
    pub fn bfs(&self, start: &str, direction: Direction) -> Vec<String> {
        if !self.has_node(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.to_string());
        visited.insert(start.to_string());
        while let Some(node) = queue.pop_front() {
            order.push(node.clone());
            for next in self.neighbors(&node, direction) {
                if visited.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        order
    }

    /// Pre-order DFS, visiting `start` first.
    pub fn dfs(&self, start: &str, direction: Direction) -> Vec<String> {
        if !self.has_node(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![start.to_string()];
        while let Some(node) = stack.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }
            order.push(node.clone());
            // Push in reverse so the lexicographically-first neighbor is
            // popped (and thus visited) first.
            for next in self.neighbors(&node, direction).iter().rev() {
                if !visited.contains(next) {
                    stack.push(next.clone());
                }
            }
        }
        order
    }

    /// BFS-reachable set excluding `start`.
    pub fn transitive_closure(&self, start: &str) -> Vec<String> {
        self.bfs(start, Direction::Forward).into_iter().filter(|id| id != start).collect()
    }

    pub fn reverse_transitive_closure(&self, start: &str) -> Vec<String> {
        self.bfs(start, Direction::Reverse).into_iter().filter(|id| id != start).collect()
    }

    /// BFS shortest path. `[from]` if equal, `None` if unreachable, otherwise
    /// inclusive of both endpoints.
    pub fn shortest_path(&self, from: &str, to: &str, direction: Direction) -> Option<Vec<String>> {
        if from == to {
            return if self.has_node(from) { Some(vec![from.to_string()]) } else { None };
        }
        if !self.has_node(from) {
            return None;
        }
        let mut visited = HashSet::new();
        let mut parent: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from.to_string());
        visited.insert(from.to_string());
        while let Some(node) = queue.pop_front() {
            for next in self.neighbors(&node, direction) {
                if visited.insert(next.clone()) {
                    parent.insert(next.clone(), node.clone());
                    if next == to {
                        let mut path = vec![next.clone()];
                        let mut cur = next.clone();
                        while let Some(p) = parent.get(&cur) {
                            path.push(p.clone());
                            cur = p.clone();
                        }
                        path.reverse();
                        return Some(path);
                    }
                    queue.push_back(next.clone());
                }
            }
        }
        None
    }

    /// `(has_cycle, witness_path)`. Cyclicity itself is decided by Tarjan's
    /// SCC algorithm over a `petgraph::DiGraph` view of this adjacency (a
    /// non-trivial SCC, or a node with a self-loop, means a cycle) the same
    /// way the teacher's dependency graph does; the witness path is then
    /// recovered with a DFS current-path stack, since `tarjan_scc` reports
    /// component membership, not a path through it.
    pub fn find_cycles(&self) -> (bool, Vec<String>) {
        if !self.has_cycle() {
            return (false, Vec::new());
        }

        let mut visited = HashSet::new();
        let mut on_stack = Vec::new();
        let mut on_stack_set = HashSet::new();

        for start in &self.nodes {
            if visited.contains(start) {
                continue;
            }
            if let Some(witness) = self.dfs_find_cycle(start, &mut visited, &mut on_stack, &mut on_stack_set) {
                return (true, witness);
            }
        }
        (true, Vec::new())
    }

    fn has_cycle(&self) -> bool {
        let (graph, _) = self.to_petgraph();
        tarjan_scc(&graph)
            .into_iter()
            .any(|scc| scc.len() > 1 || scc.iter().any(|&idx| graph.find_edge(idx, idx).is_some()))
    }

    fn dfs_find_cycle(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        on_stack: &mut Vec<String>,
        on_stack_set: &mut HashSet<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        on_stack.push(node.to_string());
        on_stack_set.insert(node.to_string());

        for next in self.successors(node) {
            if on_stack_set.contains(next) {
                let pos = on_stack.iter().position(|n| n == next).unwrap();
                return Some(on_stack[pos..].to_vec());
            }
            if !visited.contains(next) {
                if let Some(witness) = self.dfs_find_cycle(next, visited, on_stack, on_stack_set) {
                    return Some(witness);
                }
            }
        }

        on_stack.pop();
        on_stack_set.remove(node);
        None
    }

    /// Kahn's algorithm over a `petgraph::DiGraph` view of this adjacency,
    /// the way the teacher's `compute_topological_order` does, with an
    /// id-ascending tie-break among zero-in-degree nodes for determinism
    /// (petgraph's own `toposort` doesn't guarantee one). `None` iff cyclic.
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        let (graph, index_of) = self.to_petgraph();
        let mut in_degree: std::collections::HashMap<petgraph::graph::NodeIndex, usize> = graph
            .node_indices()
            .map(|idx| (idx, graph.neighbors_directed(idx, PetDirection::Incoming).count()))
            .collect();

        let mut ready: std::collections::BTreeSet<String> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&idx, _)| graph[idx].clone())
            .collect();

        let mut order = Vec::new();
        while let Some(node) = ready.iter().next().cloned() {
            ready.remove(&node);
            order.push(node.clone());
            let idx = index_of[&node];
            for next in graph.neighbors_directed(idx, PetDirection::Outgoing) {
                if let Some(d) = in_degree.get_mut(&next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(graph[next].clone());
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Some(order)
        } else {
            None
        }
    }

    /// Simple paths (no repeated nodes) from `from` to `to`, depth-bounded.
    /// `max_depth` counts edges, so a path has at most `max_depth + 1` nodes.
    pub fn all_paths(&self, from: &str, to: &str, max_depth: usize) -> Vec<Vec<String>> {
        self.all_paths_in(from, to, max_depth, Direction::Forward)
    }

    pub fn all_paths_reverse(&self, from: &str, to: &str, max_depth: usize) -> Vec<Vec<String>> {
        self.all_paths_in(from, to, max_depth, Direction::Reverse)
    }

    fn all_paths_in(&self, from: &str, to: &str, max_depth: usize, direction: Direction) -> Vec<Vec<String>> {
        if !self.has_node(from) || !self.has_node(to) {
            return Vec::new();
        }
        let mut results = Vec::new();
        let mut path = vec![from.to_string()];
        let mut on_path: HashSet<String> = HashSet::from([from.to_string()]);
        self.all_paths_dfs(from, to, max_depth, direction, &mut path, &mut on_path, &mut results);
        results
    }

    #[allow(clippy::too_many_arguments)]
    fn all_paths_dfs(
        &self,
        current: &str,
        to: &str,
        remaining_depth: usize,
        direction: Direction,
        path: &mut Vec<String>,
        on_path: &mut HashSet<String>,
        results: &mut Vec<Vec<String>>,
    ) {
        if current == to {
            results.push(path.clone());
            return;
        }
        if remaining_depth == 0 {
            return;
        }
        for next in self.neighbors(current, direction) {
            if on_path.contains(next) {
                continue;
            }
            path.push(next.clone());
            on_path.insert(next.clone());
            self.all_paths_dfs(next, to, remaining_depth - 1, direction, path, on_path, results);
            path.pop();
            on_path.remove(next);
        }
    }

    /// Reverse-direction paths terminating at `id` (callers reaching `id`).
    pub fn trace_callers(&self, id: &str, depth: usize) -> Vec<Vec<String>> {
        self.trace(id, depth, Direction::Reverse)
    }

    /// Forward-direction paths starting at `id` (callees reached from `id`).
    pub fn trace_callees(&self, id: &str, depth: usize) -> Vec<Vec<String>> {
        self.trace(id, depth, Direction::Forward)
    }

    fn trace(&self, id: &str, depth: usize, direction: Direction) -> Vec<Vec<String>> {
        if !self.has_node(id) {
            return Vec::new();
        }
        let mut results = Vec::new();
        let mut path = vec![id.to_string()];
        let mut on_path: HashSet<String> = HashSet::from([id.to_string()]);
        self.trace_dfs(id, depth, direction, &mut path, &mut on_path, &mut results);
        results
    }

    fn trace_dfs(
        &self,
        current: &str,
        remaining_depth: usize,
        direction: Direction,
        path: &mut Vec<String>,
        on_path: &mut HashSet<String>,
        results: &mut Vec<Vec<String>>,
    ) {
        let neighbors = self.neighbors(current, direction);
        if remaining_depth == 0 || neighbors.is_empty() {
            if path.len() > 1 {
                results.push(path.clone());
            }
            return;
        }
        let mut extended = false;
        for next in neighbors {
            if on_path.contains(next) {
                continue;
            }
            extended = true;
            path.push(next.clone());
            on_path.insert(next.clone());
            self.trace_dfs(next, remaining_depth - 1, direction, path, on_path, results);
            path.pop();
            on_path.remove(next);
        }
        if !extended && path.len() > 1 {
            results.push(path.clone());
        }
    }

    /// BFS-ordered linear view of callers reaching `id`, truncated to
    /// `max_depth + 1` nodes (including `id` itself).
    pub fn collect_caller_chain(&self, id: &str, max_depth: usize) -> Vec<String> {
        self.collect_chain(id, max_depth, Direction::Reverse)
    }

    pub fn collect_callee_chain(&self, id: &str, max_depth: usize) -> Vec<String> {
        self.collect_chain(id, max_depth, Direction::Forward)
    }

    fn collect_chain(&self, id: &str, max_depth: usize, direction: Direction) -> Vec<String> {
        let chain = self.bfs(id, direction);
        chain.into_iter().take(max_depth + 1).collect()
    }
}
