//! Storage port traits: `domain` defines the interface, `infrastructure::sqlite`
//! implements it. These traits are synchronous rather than `#[async_trait]` —
//! scan/query operations here are single-threaded and return only once durable,
//! so an async boundary would add nothing but ceremony.

use crate::error::Result;
use cx_domain::{Dependency, Entity, EntityFilter, Metrics, Ref, SearchHit};

/// Persistent entity/dependency/metric database (`store.db`).
pub trait Store: Send + Sync {
    fn upsert_entity(&self, entity: &Entity) -> Result<()>;
    fn bulk_upsert(&self, entities: &[Entity]) -> Result<()>;

    fn upsert_dependency(&self, dep: &Dependency) -> Result<()>;
    fn bulk_upsert_deps(&self, deps: &[Dependency]) -> Result<()>;

    fn get_entity(&self, id: &str) -> Result<Entity>;
    fn query_entities(&self, filter: &EntityFilter, limit: Option<usize>) -> Result<Vec<Entity>>;
    fn query_entities_at(&self, filter: &EntityFilter, at_ref: &Ref) -> Result<Vec<Entity>>;
    fn search_entities(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    fn get_dependencies_from(&self, id: &str) -> Result<Vec<Dependency>>;
    fn get_dependencies_to(&self, id: &str) -> Result<Vec<Dependency>>;
    fn get_all_dependencies(&self) -> Result<Vec<Dependency>>;

    /// Flip status to archived and stamp `last_seen_ref`. Soft delete: the
    /// row is never removed.
    fn archive(&self, ids: &[String], at_ref: &Ref) -> Result<()>;
    /// Flip status back to active (soft-delete revival).
    fn restore(&self, ids: &[String]) -> Result<()>;

    fn count_entities(&self, filter: &EntityFilter) -> Result<usize>;
    fn get_top_by_pagerank(&self, n: usize) -> Result<Vec<Entity>>;
    fn get_top_by_out_degree(&self, n: usize) -> Result<Vec<Entity>>;

    fn save_metrics(&self, metrics: &Metrics) -> Result<()>;
    fn save_bulk_metrics(&self, metrics: &[Metrics]) -> Result<()>;
    fn get_metrics(&self, entity_id: &str) -> Result<Option<Metrics>>;

    fn stats(&self) -> Result<StorageStats>;
}

/// Lightweight incremental-scan index (`cache.db`).
pub trait Cache: Send + Sync {
    fn set_file_scanned(&self, path: &str, hash: &str) -> Result<()>;
    fn get_file_hash(&self, path: &str) -> Result<Option<String>>;
    /// True when no prior hash exists, or the stored hash differs.
    fn is_file_changed(&self, path: &str, new_hash: &str) -> Result<bool>;
    /// Of `candidates` (path -> new hash), return the subset that changed.
    fn get_changed_files(
        &self,
        candidates: &std::collections::HashMap<String, String>,
    ) -> Result<Vec<String>>;
    /// Delete entries whose path is not in `valid_paths`; returns count pruned.
    fn prune_stale_entries(&self, valid_paths: &std::collections::HashSet<String>)
        -> Result<usize>;

    fn save_metrics(&self, metrics: &Metrics) -> Result<()>;
    fn save_bulk_metrics(&self, metrics: &[Metrics]) -> Result<()>;
    fn get_metrics(&self, entity_id: &str) -> Result<Option<Metrics>>;
    fn get_top_by_pagerank(&self, n: usize) -> Result<Vec<Metrics>>;
    fn get_keystones(&self, threshold: f64) -> Result<Vec<Metrics>>;
    fn get_bottlenecks(&self, threshold: u32) -> Result<Vec<Metrics>>;
    fn get_all_metrics(&self) -> Result<Vec<Metrics>>;
    fn delete_metrics(&self, entity_id: &str) -> Result<()>;
    fn clear_metrics(&self) -> Result<()>;
    fn clear_file_index(&self) -> Result<()>;
}

/// Aggregate counts, mirroring `features/storage/domain/ports.rs::StorageStats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageStats {
    pub total_entities: usize,
    pub total_dependencies: usize,
    pub total_files: usize,
    pub storage_size_bytes: u64,
}
