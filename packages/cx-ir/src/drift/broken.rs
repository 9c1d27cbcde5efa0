//! Broken-dependency discovery: across every breaking drift in a batch,
//! collect the callers that would observe the break, deduplicated and
//! capped — distinct from the per-entry `affected_callers` preview, which
//! caps at 5 per entry rather than 20 across the whole batch.

use cx_domain::{DepType, EntityKind};
use cx_storage::domain::Store;

use super::DriftEntry;
use crate::errors::Result;

pub fn discover_broken_dependencies(store: &dyn Store, entries: &[DriftEntry], cap: usize) -> Result<Vec<String>> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();

    for entry in entries.iter().filter(|e| e.breaking) {
        for dep in store.get_dependencies_to(&entry.entity_id)? {
            if dep.dep_type != DepType::Calls {
                continue;
            }
            if !seen.insert(dep.from_id.clone()) {
                continue;
            }
            let Ok(caller) = store.get_entity(&dep.from_id) else {
                continue;
            };
            if caller.kind == EntityKind::Import {
                continue;
            }
            names.push(caller.name);
        }
    }

    names.sort();
    names.dedup();
    names.truncate(cap);
    Ok(names)
}
