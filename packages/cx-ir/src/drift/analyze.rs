//! Mode A: stored snapshot vs. the current working tree, for a single file.
//! Parses without persisting (`extract::extract_file`), aligns the stored
//! and current entity sets by name, and classifies each side. File-hash
//! gating (skip files the incremental cache says are unchanged) is the
//! caller's responsibility — this always does the full compare.

use std::collections::HashMap;

use cx_domain::{DepType, Entity, EntityFilter, EntityKind, Status};
use cx_storage::domain::Store;
use tracing::warn;

use super::{DriftEntry, DriftKind};
use crate::ast::Language;
use crate::config::DriftConfig;
use crate::errors::Result;
use crate::extract::extract_file;

/// Resolve the distinct `calls`-dependency callers of `entity_id`, sorted
/// by caller name for deterministic truncation.
fn resolve_callers(store: &dyn Store, entity_id: &str) -> Result<Vec<String>> {
    let deps = store.get_dependencies_to(entity_id)?;
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();
    for dep in deps.iter().filter(|d| d.dep_type == DepType::Calls) {
        if !seen.insert(dep.from_id.clone()) {
            continue;
        }
        if let Ok(caller) = store.get_entity(&dep.from_id) {
            names.push(caller.name);
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}

fn stored_entities_for_file(store: &dyn Store, path: &str) -> Result<Vec<Entity>> {
    let filter = EntityFilter {
        file_path: Some(path.to_string()),
        status: Some(Status::Active),
        ..Default::default()
    };
    let entities = store.query_entities(&filter, None)?;
    Ok(entities.into_iter().filter(|e| e.kind != EntityKind::Import).collect())
}

/// A whole tracked file vanished from disk: every non-import active entity
/// it owned becomes a breaking `file_missing` drift.
pub fn analyze_missing_file(store: &dyn Store, path: &str, config: &DriftConfig) -> Result<Vec<DriftEntry>> {
    warn!("{} is tracked but missing from disk", path);
    let stored = stored_entities_for_file(store, path)?;
    let mut entries = Vec::with_capacity(stored.len());
    for entity in stored {
        let callers = resolve_callers(store, &entity.id)?;
        entries.push(DriftEntry {
            entity_id: entity.id,
            name: entity.name,
            file_path: entity.file_path,
            kind: DriftKind::FileMissing,
            breaking: true,
            old_signature: Some(entity.signature),
            new_signature: None,
            affected_callers: callers.into_iter().take(config.max_callers_per_drift).collect(),
        });
    }
    Ok(entries)
}

/// Compare the on-disk state of `path` against the store. Returns one
/// `DriftEntry` per name-aligned change; unchanged entities are omitted.
pub fn analyze_modified_file(store: &dyn Store, path: &str, config: &DriftConfig) -> Result<Vec<DriftEntry>> {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return analyze_missing_file(store, path, config),
    };
    let language = Language::identify_or_err(path)?;
    let extracted = extract_file(path, &source, language)?;

    let stored = stored_entities_for_file(store, path)?;
    let stored_by_name: HashMap<&str, &Entity> = stored.iter().map(|e| (e.name.as_str(), e)).collect();
    let current_by_name: HashMap<&str, &Entity> =
        extracted.entities.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut entries = Vec::new();

    for stored_entity in &stored {
        let Some(current_entity) = current_by_name.get(stored_entity.name.as_str()) else {
            let callers = resolve_callers(store, &stored_entity.id)?;
            entries.push(DriftEntry {
                entity_id: stored_entity.id.clone(),
                name: stored_entity.name.clone(),
                file_path: stored_entity.file_path.clone(),
                kind: DriftKind::Removed,
                breaking: !callers.is_empty(),
                old_signature: Some(stored_entity.signature.clone()),
                new_signature: None,
                affected_callers: callers.into_iter().take(config.max_callers_per_drift).collect(),
            });
            continue;
        };

        if stored_entity.sig_hash != current_entity.sig_hash {
            let callers = resolve_callers(store, &stored_entity.id)?;
            entries.push(DriftEntry {
                entity_id: stored_entity.id.clone(),
                name: stored_entity.name.clone(),
                file_path: stored_entity.file_path.clone(),
                kind: DriftKind::SignatureChange,
                breaking: true,
                old_signature: Some(stored_entity.signature.clone()),
                new_signature: Some(current_entity.signature.clone()),
                affected_callers: callers.into_iter().take(config.max_callers_per_drift).collect(),
            });
        } else if stored_entity.body_hash != current_entity.body_hash {
            let callers = resolve_callers(store, &stored_entity.id)?;
            entries.push(DriftEntry {
                entity_id: stored_entity.id.clone(),
                name: stored_entity.name.clone(),
                file_path: stored_entity.file_path.clone(),
                kind: DriftKind::BodyChange,
                breaking: false,
                old_signature: Some(stored_entity.signature.clone()),
                new_signature: Some(current_entity.signature.clone()),
                affected_callers: callers.into_iter().take(config.max_callers_per_drift).collect(),
            });
        }
    }

    for current_entity in &extracted.entities {
        if !stored_by_name.contains_key(current_entity.name.as_str()) {
            entries.push(DriftEntry {
                entity_id: current_entity.id.clone(),
                name: current_entity.name.clone(),
                file_path: current_entity.file_path.clone(),
                kind: DriftKind::Added,
                breaking: false,
                old_signature: None,
                new_signature: Some(current_entity.signature.clone()),
                affected_callers: Vec::new(),
            });
        }
    }

    Ok(entries)
}
