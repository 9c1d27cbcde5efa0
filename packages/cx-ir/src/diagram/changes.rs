//! Changes diagram: three color-coded categories (added/modified/deleted),
//! each allocated a proportional share of `max_nodes` with a minimum of 1
//! per non-empty category.

use cx_storage::domain::Store;

use super::{Diagram, DiagramEntity, DiagramType};
use crate::drift::{DriftKind, RefDrift};
use crate::errors::Result;

const CATEGORIES: [(DriftKind, &str, &str); 3] =
    [(DriftKind::Added, "added", "green"), (DriftKind::Modified, "modified", "yellow"), (DriftKind::Removed, "deleted", "red")];

/// Proportional, minimum-1-per-category share of `max_nodes`, largest
/// category first when the floor-division shares overshoot `max_nodes`.
fn shares(counts: &[(DriftKind, usize)], max_nodes: usize) -> std::collections::HashMap<DriftKind, usize> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    let mut out = std::collections::HashMap::new();
    if total == 0 {
        return out;
    }
    for &(kind, count) in counts.iter().filter(|(_, c)| *c > 0) {
        let raw = (max_nodes as f64 * count as f64 / total as f64).floor() as usize;
        out.insert(kind, raw.max(1).min(count));
    }
    loop {
        let sum: usize = out.values().sum();
        if sum <= max_nodes {
            break;
        }
        let Some((&kind, _)) = out.iter().filter(|(_, &v)| v > 1).max_by_key(|(_, &v)| v) else {
            break;
        };
        *out.get_mut(&kind).unwrap() -= 1;
    }
    out
}

pub fn assemble_changes(store: &dyn Store, changes: &[RefDrift], max_nodes: usize) -> Result<Diagram> {
    let counts: Vec<(DriftKind, usize)> = CATEGORIES
        .iter()
        .map(|(kind, _, _)| (*kind, changes.iter().filter(|c| c.kind == *kind).count()))
        .collect();
    let allocation = shares(&counts, max_nodes);

    let mut entities = Vec::new();
    let mut truncated_count = 0;
    for (kind, _label, color) in CATEGORIES {
        let share = allocation.get(&kind).copied().unwrap_or(0);
        let mut in_category: Vec<&RefDrift> = changes.iter().filter(|c| c.kind == kind).collect();
        in_category.sort_by(|a, b| (a.file_path.as_str(), a.name.as_str()).cmp(&(b.file_path.as_str(), b.name.as_str())));
        truncated_count += in_category.len().saturating_sub(share);

        for change in in_category.into_iter().take(share) {
            let Ok(entity) = store.get_entity(&change.entity_id) else { continue };
            entities.push(DiagramEntity {
                id: entity.id,
                label: entity.name,
                kind: entity.kind.as_str().to_string(),
                file_path: entity.file_path,
                container: None,
                importance: None,
                coverage_percent: None,
                is_root: false,
                color: Some(color.to_string()),
            });
        }
    }
    entities.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Diagram { title: "Changes".to_string(), diagram_type: DiagramType::Dependency, entities, edges: Vec::new(), truncated_count })
}
