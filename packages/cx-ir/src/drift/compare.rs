//! Mode B: diff the entity set between two refs already resolved by the
//! store's time-travel support. Alignment is by id — both sides are store
//! rows, so there is no name-collision ambiguity the way Mode A has.

use std::collections::HashMap;

use cx_domain::{Entity, EntityFilter, Ref};
use cx_storage::domain::Store;

use super::{ref_label, DriftKind, RefDrift};
use crate::errors::Result;

pub fn gather_changes(store: &dyn Store, from_ref: &Ref, to_ref: &Ref) -> Result<Vec<RefDrift>> {
    let from_entities = store.query_entities_at(&EntityFilter::default(), from_ref)?;
    let to_entities = store.query_entities_at(&EntityFilter::default(), to_ref)?;

    let from_by_id: HashMap<&str, &Entity> = from_entities.iter().map(|e| (e.id.as_str(), e)).collect();
    let to_by_id: HashMap<&str, &Entity> = to_entities.iter().map(|e| (e.id.as_str(), e)).collect();

    let from_label = ref_label(from_ref);
    let to_label = ref_label(to_ref);
    let mut changes = Vec::new();

    for entity in &to_entities {
        if !from_by_id.contains_key(entity.id.as_str()) {
            changes.push(RefDrift {
                entity_id: entity.id.clone(),
                name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                from_ref: from_label.clone(),
                to_ref: to_label.clone(),
                kind: DriftKind::Added,
            });
        }
    }

    for entity in &from_entities {
        match to_by_id.get(entity.id.as_str()) {
            None => changes.push(RefDrift {
                entity_id: entity.id.clone(),
                name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                from_ref: from_label.clone(),
                to_ref: to_label.clone(),
                kind: DriftKind::Removed,
            }),
            Some(current) => {
                if entity.sig_hash != current.sig_hash
                    || entity.body_hash != current.body_hash
                    || entity.file_path != current.file_path
                {
                    changes.push(RefDrift {
                        entity_id: entity.id.clone(),
                        name: entity.name.clone(),
                        file_path: current.file_path.clone(),
                        from_ref: from_label.clone(),
                        to_ref: to_label.clone(),
                        kind: DriftKind::Modified,
                    });
                }
            }
        }
    }

    changes.sort_by(|a, b| (a.file_path.as_str(), a.name.as_str()).cmp(&(b.file_path.as_str(), b.name.as_str())));
    Ok(changes)
}
