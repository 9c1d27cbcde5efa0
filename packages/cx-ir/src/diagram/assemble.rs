//! Core assembler: turns a `Store` + `DependencyGraph` + precomputed
//! metrics into a ranked, truncated `Diagram` under a `DiagramConfig`.
//! Deterministic by construction: entities sort by id, edges sort by
//! `(from, to)`, and `max_nodes` truncation ranks by pagerank descending
//! with an id-ascending tie-break.

use std::collections::{HashMap, HashSet};

use cx_domain::{Dependency, Importance, Metrics};
use cx_storage::domain::Store;
use tracing::debug;

use super::{DiagramConfig, DiagramEdge, DiagramEntity};
use crate::errors::Result;
use crate::graph::{DependencyGraph, Direction};

fn container_for(file_path: &str) -> String {
    match file_path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}

/// Rank `ids` by pagerank descending (id-ascending tie-break) and keep the
/// top `max_nodes`, returning the retained set plus how many were dropped.
fn rank_and_truncate(ids: Vec<String>, metrics: &HashMap<String, Metrics>, max_nodes: usize) -> (Vec<String>, usize) {
    let mut ranked = ids;
    ranked.sort_by(|a, b| {
        let pa = metrics.get(a).map(|m| m.pagerank).unwrap_or(0.0);
        let pb = metrics.get(b).map(|m| m.pagerank).unwrap_or(0.0);
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.cmp(b))
    });
    let truncated = ranked.len().saturating_sub(max_nodes);
    ranked.truncate(max_nodes);
    (ranked, truncated)
}

fn build_entities(
    store: &dyn Store,
    ids: &[String],
    metrics: &HashMap<String, Metrics>,
    config: &DiagramConfig,
    root: Option<&str>,
) -> Result<Vec<DiagramEntity>> {
    let mut entities = Vec::with_capacity(ids.len());
    for id in ids {
        let Ok(entity) = store.get_entity(id) else { continue };
        let importance = metrics.get(id).map(Importance::classify).map(|i| format!("{i:?}").to_lowercase());
        entities.push(DiagramEntity {
            id: entity.id.clone(),
            label: entity.name,
            kind: entity.kind.as_str().to_string(),
            file_path: entity.file_path.clone(),
            container: if config.collapse { Some(container_for(&entity.file_path)) } else { None },
            importance,
            coverage_percent: None,
            is_root: root == Some(id.as_str()),
            color: None,
        });
    }
    entities.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entities)
}

fn build_edges(deps: &[Dependency], retained: &HashSet<String>) -> Vec<DiagramEdge> {
    let mut edges: Vec<DiagramEdge> = deps
        .iter()
        .filter(|d| d.dep_type.is_code_dependency() && retained.contains(&d.from_id) && retained.contains(&d.to_id))
        .map(|d| DiagramEdge { from: d.from_id.clone(), to: d.to_id.clone(), dep_type: d.dep_type.as_str().to_string() })
        .collect();
    edges.sort();
    edges.dedup();
    edges
}

/// General-purpose assembly for the architecture/coverage/dependency
/// presets: rank every graph node by pagerank, truncate to `max_nodes`.
pub fn assemble(
    store: &dyn Store,
    graph: &DependencyGraph,
    metrics: &HashMap<String, Metrics>,
    config: &DiagramConfig,
) -> Result<super::Diagram> {
    let (retained_ids, truncated_count) = rank_and_truncate(graph.nodes().to_vec(), metrics, config.max_nodes);
    let retained: HashSet<String> = retained_ids.iter().cloned().collect();
    let entities = build_entities(store, &retained_ids, metrics, config, None)?;
    let deps = store.get_all_dependencies()?;
    let edges = build_edges(&deps, &retained);
    debug!("assembled {:?} diagram with {} entities, {} truncated", config.diagram_type, entities.len(), truncated_count);

    Ok(super::Diagram {
        title: config.title.clone().unwrap_or_default(),
        diagram_type: config.diagram_type,
        entities,
        edges,
        truncated_count,
    })
}

fn bfs_within_depth(graph: &DependencyGraph, root: &str, direction: Direction, depth: usize) -> Vec<String> {
    let mut visited: HashMap<String, usize> = HashMap::new();
    visited.insert(root.to_string(), 0);
    let mut frontier = vec![root.to_string()];
    let mut level = 0;
    while level < depth && !frontier.is_empty() {
        let mut next = Vec::new();
        for node in &frontier {
            for neighbor in graph.neighbors(node, direction) {
                if !visited.contains_key(neighbor) {
                    visited.insert(neighbor.clone(), level + 1);
                    next.push(neighbor.clone());
                }
            }
        }
        frontier = next;
        level += 1;
    }
    let mut ids: Vec<String> = visited.into_keys().collect();
    ids.sort();
    ids
}

/// BFS from `root` following outgoing `calls` edges up to `depth` (spec
/// default 3, cap 10), with `root` marked `is_root` for emphasis.
pub fn assemble_call_flow(
    store: &dyn Store,
    graph: &DependencyGraph,
    metrics: &HashMap<String, Metrics>,
    config: &DiagramConfig,
    root: &str,
    depth: usize,
) -> Result<super::Diagram> {
    assemble_flow(store, graph, metrics, config, root, depth, Direction::Forward)
}

/// Symmetric reverse-edge variant: who calls `root`, transitively.
pub fn assemble_caller_flow(
    store: &dyn Store,
    graph: &DependencyGraph,
    metrics: &HashMap<String, Metrics>,
    config: &DiagramConfig,
    root: &str,
    depth: usize,
) -> Result<super::Diagram> {
    assemble_flow(store, graph, metrics, config, root, depth, Direction::Reverse)
}

fn assemble_flow(
    store: &dyn Store,
    graph: &DependencyGraph,
    metrics: &HashMap<String, Metrics>,
    config: &DiagramConfig,
    root: &str,
    depth: usize,
    direction: Direction,
) -> Result<super::Diagram> {
    let depth = depth.min(10);
    let reached = bfs_within_depth(graph, root, direction, depth);
    let (retained_ids, truncated_count) = rank_and_truncate(reached, metrics, config.max_nodes);
    let retained: HashSet<String> = retained_ids.iter().cloned().collect();
    let entities = build_entities(store, &retained_ids, metrics, config, Some(root))?;
    let deps = store.get_all_dependencies()?;
    let edges = build_edges(&deps, &retained);

    Ok(super::Diagram {
        title: config.title.clone().unwrap_or_default(),
        diagram_type: config.diagram_type,
        entities,
        edges,
        truncated_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramType;
    use chrono::Utc;
    use cx_domain::{DepType, Entity, EntityFilter, EntityKind, Ref, SearchHit, Status};
    use cx_storage::error::Result as StorageResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        entities: Mutex<HashMap<String, Entity>>,
        deps: Vec<Dependency>,
    }

    impl Store for FakeStore {
        fn upsert_entity(&self, entity: &Entity) -> StorageResult<()> {
            self.entities.lock().unwrap().insert(entity.id.clone(), entity.clone());
            Ok(())
        }
        fn bulk_upsert(&self, entities: &[Entity]) -> StorageResult<()> {
            for e in entities {
                self.upsert_entity(e)?;
            }
            Ok(())
        }
        fn upsert_dependency(&self, _dep: &Dependency) -> StorageResult<()> {
            Ok(())
        }
        fn bulk_upsert_deps(&self, _deps: &[Dependency]) -> StorageResult<()> {
            Ok(())
        }
        fn get_entity(&self, id: &str) -> StorageResult<Entity> {
            self.entities
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| cx_storage::error::StorageError::not_found(id))
        }
        fn query_entities(&self, _filter: &EntityFilter, _limit: Option<usize>) -> StorageResult<Vec<Entity>> {
            Ok(self.entities.lock().unwrap().values().cloned().collect())
        }
        fn query_entities_at(&self, filter: &EntityFilter, _at_ref: &Ref) -> StorageResult<Vec<Entity>> {
            self.query_entities(filter, None)
        }
        fn search_entities(&self, _query: &str, _limit: usize) -> StorageResult<Vec<SearchHit>> {
            Ok(Vec::new())
        }
        fn get_dependencies_from(&self, id: &str) -> StorageResult<Vec<Dependency>> {
            Ok(self.deps.iter().filter(|d| d.from_id == id).cloned().collect())
        }
        fn get_dependencies_to(&self, id: &str) -> StorageResult<Vec<Dependency>> {
            Ok(self.deps.iter().filter(|d| d.to_id == id).cloned().collect())
        }
        fn get_all_dependencies(&self) -> StorageResult<Vec<Dependency>> {
            Ok(self.deps.clone())
        }
        fn archive(&self, _ids: &[String], _at_ref: &Ref) -> StorageResult<()> {
            Ok(())
        }
        fn restore(&self, _ids: &[String]) -> StorageResult<()> {
            Ok(())
        }
        fn count_entities(&self, filter: &EntityFilter) -> StorageResult<usize> {
            Ok(self.query_entities(filter, None)?.len())
        }
        fn get_top_by_pagerank(&self, _n: usize) -> StorageResult<Vec<Entity>> {
            Ok(Vec::new())
        }
        fn get_top_by_out_degree(&self, _n: usize) -> StorageResult<Vec<Entity>> {
            Ok(Vec::new())
        }
        fn save_metrics(&self, _metrics: &Metrics) -> StorageResult<()> {
            Ok(())
        }
        fn save_bulk_metrics(&self, _metrics: &[Metrics]) -> StorageResult<()> {
            Ok(())
        }
        fn get_metrics(&self, _entity_id: &str) -> StorageResult<Option<Metrics>> {
            Ok(None)
        }
        fn stats(&self) -> StorageResult<cx_storage::domain::StorageStats> {
            Ok(Default::default())
        }
    }

    fn entity(name: &str, file: &str) -> Entity {
        let mut e = Entity::new(file, EntityKind::Function, name, 1, None, "go", format!("func {name}()"), "");
        e.status = Status::Active;
        e
    }

    fn metric(id: &str, pagerank: f64) -> (String, Metrics) {
        (
            id.to_string(),
            Metrics { entity_id: id.to_string(), pagerank, in_degree: 0, out_degree: 0, betweenness: 0.0, computed_at: Utc::now() },
        )
    }

    #[test]
    fn assemble_truncates_by_pagerank_descending() {
        let mut store = FakeStore::default();
        let a = entity("A", "a.go");
        let b = entity("B", "a.go");
        let c = entity("C", "a.go");
        store.upsert_entity(&a).unwrap();
        store.upsert_entity(&b).unwrap();
        store.upsert_entity(&c).unwrap();
        store.deps = vec![
            Dependency::new(a.id.clone(), b.id.clone(), DepType::Calls),
            Dependency::new(b.id.clone(), c.id.clone(), DepType::Calls),
        ];
        let graph = DependencyGraph::build(&store.deps);
        let metrics: HashMap<String, Metrics> =
            [metric(&a.id, 0.1), metric(&b.id, 0.9), metric(&c.id, 0.5)].into_iter().collect();

        let mut config = DiagramConfig::preset(DiagramType::Dependency, &crate::config::CxConfig::default());
        config.max_nodes = 2;
        let diagram = assemble(&store, &graph, &metrics, &config).unwrap();
        assert_eq!(diagram.truncated_count, 1);
        let ids: Vec<&str> = diagram.entities.iter().map(|e| e.id.as_str()).collect();
        assert!(ids.contains(&b.id.as_str()));
        assert!(ids.contains(&c.id.as_str()));
        assert!(!ids.contains(&a.id.as_str()));
    }

    #[test]
    fn call_flow_marks_the_root_and_respects_depth() {
        let mut store = FakeStore::default();
        let a = entity("A", "a.go");
        let b = entity("B", "a.go");
        let c = entity("C", "a.go");
        store.upsert_entity(&a).unwrap();
        store.upsert_entity(&b).unwrap();
        store.upsert_entity(&c).unwrap();
        store.deps = vec![
            Dependency::new(a.id.clone(), b.id.clone(), DepType::Calls),
            Dependency::new(b.id.clone(), c.id.clone(), DepType::Calls),
        ];
        let graph = DependencyGraph::build(&store.deps);
        let metrics = HashMap::new();
        let mut config = DiagramConfig::preset(DiagramType::CallFlow, &crate::config::CxConfig::default());
        config.max_nodes = 10;

        let diagram = assemble_call_flow(&store, &graph, &metrics, &config, &a.id, 1).unwrap();
        let root_entity = diagram.entities.iter().find(|e| e.id == a.id).unwrap();
        assert!(root_entity.is_root);
        assert!(!diagram.entities.iter().any(|e| e.id == c.id), "depth 1 must not reach C");
    }
}
