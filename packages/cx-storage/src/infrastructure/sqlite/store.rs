//! `SqliteStore`: concrete `Store` implementation over `store.db`.
//!
//! A single connection behind a mutex, with transactional bulk writes and
//! an FTS5 virtual table kept in sync on every upsert.

use std::path::Path;
use std::sync::Mutex;

use cx_domain::{Dependency, Entity, EntityFilter, Metrics, Ref, SearchHit, Status};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::rows::{
    dep_type_from_str, dep_type_to_str, entity_from_row, format_timestamp, kind_to_str,
    metrics_from_row, status_to_str, visibility_to_str, ENTITY_COLUMNS, METRICS_COLUMNS,
};
use super::schema::init_store_schema;
use crate::domain::{StorageStats, Store};
use crate::error::{Result, StorageError};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<std::path::PathBuf>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        init_store_schema(&conn)?;
        info!("opened store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_store_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn reindex_fts(conn: &Connection, entity: &Entity) -> Result<()> {
        conn.execute("DELETE FROM entities_fts WHERE id = ?1", params![entity.id])?;
        conn.execute(
            "INSERT INTO entities_fts (id, name, qualified_name, doc_comment, signature)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entity.id,
                entity.name,
                entity.qualified_name,
                entity.doc_comment,
                entity.signature,
            ],
        )?;
        Ok(())
    }

    fn write_entity(conn: &Connection, entity: &Entity) -> Result<()> {
        let params_json = serde_json::to_string(&entity.params)?;
        conn.execute(
            &format!(
                "INSERT INTO entities ({ENTITY_COLUMNS})
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)
                 ON CONFLICT(id) DO UPDATE SET
                    name=excluded.name, qualified_name=excluded.qualified_name,
                    kind=excluded.kind, file_path=excluded.file_path,
                    line_start=excluded.line_start, line_end=excluded.line_end,
                    language=excluded.language, signature=excluded.signature,
                    sig_hash=excluded.sig_hash, body_hash=excluded.body_hash,
                    doc_comment=excluded.doc_comment, visibility=excluded.visibility,
                    params=excluded.params, status=excluded.status,
                    first_seen_ref=excluded.first_seen_ref, last_seen_ref=excluded.last_seen_ref"
            ),
            params![
                entity.id,
                entity.name,
                entity.qualified_name,
                kind_to_str(entity.kind),
                entity.file_path,
                entity.line_start,
                entity.line_end,
                entity.language,
                entity.signature,
                entity.sig_hash,
                entity.body_hash,
                entity.doc_comment,
                visibility_to_str(entity.visibility),
                params_json,
                status_to_str(entity.status),
                entity.first_seen_ref,
                entity.last_seen_ref,
            ],
        )?;
        Self::reindex_fts(conn, entity)?;
        Ok(())
    }

    /// Resolve a `Ref` to the monotonic sequence number recorded for it in
    /// `scan_refs`, registering the ref with the next sequence if unseen.
    /// `HEAD`/`HEAD~N` resolve relative to the highest seq currently stored.
    fn resolve_seq(conn: &Connection, at_ref: &Ref) -> Result<i64> {
        match at_ref {
            Ref::Head => {
                let max: Option<i64> = conn
                    .query_row("SELECT MAX(seq) FROM scan_refs", [], |r| r.get(0))
                    .optional()?
                    .flatten();
                Ok(max.unwrap_or(0))
            }
            Ref::HeadRelative(n) => {
                let max: Option<i64> = conn
                    .query_row("SELECT MAX(seq) FROM scan_refs", [], |r| r.get(0))
                    .optional()?
                    .flatten();
                Ok(max.unwrap_or(0) - (*n as i64))
            }
            Ref::Hex(label) | Ref::Tag(label) | Ref::Date(label) => {
                let seq: Option<i64> = conn
                    .query_row(
                        "SELECT seq FROM scan_refs WHERE ref_label = ?1",
                        params![label],
                        |r| r.get(0),
                    )
                    .optional()?;
                seq.ok_or_else(|| StorageError::not_found(format!("unknown ref '{label}'")))
            }
        }
    }

    fn entity_seq(conn: &Connection, ref_label: &Option<String>) -> Result<i64> {
        match ref_label {
            None => Ok(0),
            Some(label) => conn
                .query_row(
                    "SELECT seq FROM scan_refs WHERE ref_label = ?1",
                    params![label],
                    |r| r.get(0),
                )
                .optional()
                .map(|v| v.unwrap_or(i64::MAX))
                .map_err(StorageError::from),
        }
    }

    /// A dependency is valid only if both endpoints exist; reject dangling
    /// edges before they reach the table rather than let them insert silently.
    fn check_dependency_endpoints(conn: &Connection, deps: &[Dependency]) -> Result<()> {
        let mut stmt = conn.prepare("SELECT 1 FROM entities WHERE id = ?1")?;
        let mut exists = |id: &str| -> Result<bool> {
            Ok(stmt.query_row(params![id], |_| Ok(())).optional()?.is_some())
        };
        for dep in deps {
            if !exists(&dep.from_id)? {
                return Err(StorageError::integrity_violation(format!(
                    "dependency endpoint '{}' does not exist",
                    dep.from_id
                )));
            }
            if !exists(&dep.to_id)? {
                return Err(StorageError::integrity_violation(format!(
                    "dependency endpoint '{}' does not exist",
                    dep.to_id
                )));
            }
        }
        Ok(())
    }

    fn build_filter_clause(filter: &EntityFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut clauses = Vec::new();
        let mut binds: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(name) = &filter.name {
            clauses.push("name = ?".to_string());
            binds.push(Box::new(name.clone()));
        }
        if let Some(file_path) = &filter.file_path {
            clauses.push("file_path = ?".to_string());
            binds.push(Box::new(file_path.clone()));
        }
        if let Some(kind) = filter.kind {
            clauses.push("kind = ?".to_string());
            binds.push(Box::new(kind_to_str(kind).to_string()));
        }
        if let Some(language) = &filter.language {
            clauses.push("language = ?".to_string());
            binds.push(Box::new(language.clone()));
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?".to_string());
            binds.push(Box::new(status_to_str(status).to_string()));
        }

        if clauses.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), binds)
        }
    }
}

impl Store for SqliteStore {
    fn upsert_entity(&self, entity: &Entity) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::write_entity(&conn, entity)
    }

    fn bulk_upsert(&self, entities: &[Entity]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for entity in entities {
            Self::write_entity(&tx, entity)?;
        }
        tx.commit()?;
        debug!("bulk upserted {} entities", entities.len());
        Ok(())
    }

    fn upsert_dependency(&self, dep: &Dependency) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::check_dependency_endpoints(&conn, std::slice::from_ref(dep))?;
        conn.execute(
            "INSERT INTO dependencies (from_id, to_id, dep_type) VALUES (?1, ?2, ?3)
             ON CONFLICT(from_id, to_id, dep_type) DO NOTHING",
            params![dep.from_id, dep.to_id, dep_type_to_str(dep.dep_type)],
        )?;
        Ok(())
    }

    fn bulk_upsert_deps(&self, deps: &[Dependency]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        Self::check_dependency_endpoints(&conn, deps)?;
        let tx = conn.transaction()?;
        for dep in deps {
            tx.execute(
                "INSERT INTO dependencies (from_id, to_id, dep_type) VALUES (?1, ?2, ?3)
                 ON CONFLICT(from_id, to_id, dep_type) DO NOTHING",
                params![dep.from_id, dep.to_id, dep_type_to_str(dep.dep_type)],
            )?;
        }
        tx.commit()?;
        debug!("bulk upserted {} dependencies", deps.len());
        Ok(())
    }

    fn get_entity(&self, id: &str) -> Result<Entity> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1"),
            params![id],
            entity_from_row,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found(format!("entity '{id}' not found")))
    }

    fn query_entities(&self, filter: &EntityFilter, limit: Option<usize>) -> Result<Vec<Entity>> {
        let conn = self.conn.lock().unwrap();
        let (clause, binds) = Self::build_filter_clause(filter);
        let limit_clause = limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default();
        let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities{clause} ORDER BY file_path, line_start{limit_clause}");
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), entity_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn query_entities_at(&self, filter: &EntityFilter, at_ref: &Ref) -> Result<Vec<Entity>> {
        let conn = self.conn.lock().unwrap();
        let target_seq = Self::resolve_seq(&conn, at_ref)?;
        let (clause, binds) = Self::build_filter_clause(filter);
        let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities{clause}");
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), entity_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            let entity = row?;
            let first_seq = Self::entity_seq(&conn, &entity.first_seen_ref)?;
            let last_seq = match &entity.last_seen_ref {
                Some(_) if entity.status == Status::Archived => {
                    Self::entity_seq(&conn, &entity.last_seen_ref)?
                }
                _ => i64::MAX,
            };
            if first_seq <= target_seq && target_seq < last_seq {
                out.push(entity);
            }
        }
        out.sort_by(|a, b| (&a.file_path, a.line_start).cmp(&(&b.file_path, b.line_start)));
        Ok(out)
    }

    fn search_entities(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT e.id, bm25(entities_fts) as score
             FROM entities_fts f
             JOIN entities e ON e.id = f.id
             WHERE entities_fts MATCH ?1 AND e.status = 'active'
             ORDER BY score LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![query, limit as i64], |row| {
            let id: String = row.get(0)?;
            let score: f64 = row.get(1)?;
            Ok((id, score))
        })?;

        let mut hits = Vec::new();
        let mut max_fts: f64 = 0.0;
        for row in rows {
            let (id, raw_score) = row?;
            // bm25() returns lower-is-better; invert and clamp to a positive scale.
            let fts_score = 1.0 / (1.0 + raw_score.max(0.0));
            max_fts = max_fts.max(fts_score);
            hits.push((id, fts_score));
        }
        drop(stmt);

        let alpha = 0.6;
        let mut max_pagerank: f64 = 0.0;
        let mut enriched = Vec::new();
        for (id, fts_score) in hits {
            let entity = conn
                .query_row(
                    &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1"),
                    params![id],
                    entity_from_row,
                )
                .optional()?;
            let Some(entity) = entity else { continue };
            let pagerank: f64 = conn
                .query_row(
                    "SELECT pagerank FROM metrics WHERE entity_id = ?1",
                    params![id],
                    |r| r.get(0),
                )
                .optional()?
                .unwrap_or(0.0);
            max_pagerank = max_pagerank.max(pagerank);
            enriched.push((entity, fts_score, pagerank));
        }

        let mut out: Vec<SearchHit> = enriched
            .into_iter()
            .map(|(entity, fts_score, pagerank)| {
                let norm_fts = if max_fts > 0.0 { fts_score / max_fts } else { 0.0 };
                let norm_pr = if max_pagerank > 0.0 { pagerank / max_pagerank } else { 0.0 };
                let combined = alpha * norm_fts + (1.0 - alpha) * norm_pr;
                SearchHit {
                    entity,
                    fts_score,
                    pagerank,
                    combined_score: combined,
                }
            })
            .collect();
        out.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap());
        Ok(out)
    }

    fn get_dependencies_from(&self, id: &str) -> Result<Vec<Dependency>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT from_id, to_id, dep_type FROM dependencies WHERE from_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| {
            let from_id: String = row.get(0)?;
            let to_id: String = row.get(1)?;
            let dep_type: String = row.get(2)?;
            Ok((from_id, to_id, dep_type))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (from_id, to_id, dep_type) = row?;
            out.push(Dependency {
                from_id,
                to_id,
                dep_type: dep_type_from_str(&dep_type)?,
            });
        }
        Ok(out)
    }

    fn get_dependencies_to(&self, id: &str) -> Result<Vec<Dependency>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT from_id, to_id, dep_type FROM dependencies WHERE to_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| {
            let from_id: String = row.get(0)?;
            let to_id: String = row.get(1)?;
            let dep_type: String = row.get(2)?;
            Ok((from_id, to_id, dep_type))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (from_id, to_id, dep_type) = row?;
            out.push(Dependency {
                from_id,
                to_id,
                dep_type: dep_type_from_str(&dep_type)?,
            });
        }
        Ok(out)
    }

    fn get_all_dependencies(&self) -> Result<Vec<Dependency>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT from_id, to_id, dep_type FROM dependencies")?;
        let rows = stmt.query_map([], |row| {
            let from_id: String = row.get(0)?;
            let to_id: String = row.get(1)?;
            let dep_type: String = row.get(2)?;
            Ok((from_id, to_id, dep_type))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (from_id, to_id, dep_type) = row?;
            out.push(Dependency {
                from_id,
                to_id,
                dep_type: dep_type_from_str(&dep_type)?,
            });
        }
        Ok(out)
    }

    fn archive(&self, ids: &[String], at_ref: &Ref) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let label = register_ref(&conn, at_ref)?;
        let tx = conn.transaction()?;
        for id in ids {
            tx.execute(
                "UPDATE entities SET status = 'archived', last_seen_ref = ?1 WHERE id = ?2",
                params![label, id],
            )?;
        }
        tx.commit()?;
        debug!("archived {} entities at {}", ids.len(), label);
        Ok(())
    }

    fn restore(&self, ids: &[String]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for id in ids {
            tx.execute(
                "UPDATE entities SET status = 'active', last_seen_ref = NULL WHERE id = ?1",
                params![id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn count_entities(&self, filter: &EntityFilter) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let (clause, binds) = Self::build_filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM entities{clause}");
        let param_refs: Vec<&dyn rusqlite::ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, param_refs.as_slice(), |r| r.get(0))?;
        Ok(count as usize)
    }

    fn get_top_by_pagerank(&self, n: usize) -> Result<Vec<Entity>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM entities e JOIN metrics m ON m.entity_id = e.id
             WHERE e.status = 'active' ORDER BY m.pagerank DESC LIMIT ?1",
            prefixed(ENTITY_COLUMNS, "e")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![n as i64], entity_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_top_by_out_degree(&self, n: usize) -> Result<Vec<Entity>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM entities e JOIN metrics m ON m.entity_id = e.id
             WHERE e.status = 'active' ORDER BY m.out_degree DESC LIMIT ?1",
            prefixed(ENTITY_COLUMNS, "e")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![n as i64], entity_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn save_metrics(&self, metrics: &Metrics) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        write_metrics(&conn, metrics)
    }

    fn save_bulk_metrics(&self, metrics: &[Metrics]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for m in metrics {
            write_metrics(&tx, m)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_metrics(&self, entity_id: &str) -> Result<Option<Metrics>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {METRICS_COLUMNS} FROM metrics WHERE entity_id = ?1"),
            params![entity_id],
            metrics_from_row,
        )
        .optional()
        .map_err(StorageError::from)
    }

    fn stats(&self) -> Result<StorageStats> {
        let conn = self.conn.lock().unwrap();
        let total_entities: i64 = conn.query_row("SELECT COUNT(*) FROM entities", [], |r| r.get(0))?;
        let total_dependencies: i64 = conn.query_row("SELECT COUNT(*) FROM dependencies", [], |r| r.get(0))?;
        let total_files: i64 =
            conn.query_row("SELECT COUNT(DISTINCT file_path) FROM entities", [], |r| r.get(0))?;
        let storage_size_bytes = self
            .db_path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(StorageStats {
            total_entities: total_entities as usize,
            total_dependencies: total_dependencies as usize,
            total_files: total_files as usize,
            storage_size_bytes,
        })
    }
}

fn write_metrics(conn: &Connection, metrics: &Metrics) -> Result<()> {
    conn.execute(
        "INSERT INTO metrics (entity_id, pagerank, in_degree, out_degree, betweenness, computed_at)
         VALUES (?1,?2,?3,?4,?5,?6)
         ON CONFLICT(entity_id) DO UPDATE SET
            pagerank=excluded.pagerank, in_degree=excluded.in_degree,
            out_degree=excluded.out_degree, betweenness=excluded.betweenness,
            computed_at=excluded.computed_at",
        params![
            metrics.entity_id,
            metrics.pagerank,
            metrics.in_degree,
            metrics.out_degree,
            metrics.betweenness,
            format_timestamp(&metrics.computed_at),
        ],
    )?;
    Ok(())
}

/// Register `at_ref` in `scan_refs` if it names a concrete label (hex/tag/date),
/// assigning it the next sequence number; returns the label to stamp onto rows.
/// `HEAD`/`HEAD~N` are resolved, never registered — they have no stable label.
fn register_ref(conn: &Connection, at_ref: &Ref) -> Result<String> {
    match at_ref {
        Ref::Hex(label) | Ref::Tag(label) | Ref::Date(label) => {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT seq FROM scan_refs WHERE ref_label = ?1",
                    params![label],
                    |r| r.get(0),
                )
                .optional()?;
            if existing.is_none() {
                let next: i64 = conn
                    .query_row("SELECT COALESCE(MAX(seq), 0) + 1 FROM scan_refs", [], |r| r.get(0))?;
                conn.execute(
                    "INSERT INTO scan_refs (ref_label, seq) VALUES (?1, ?2)",
                    params![label, next],
                )?;
            }
            Ok(label.clone())
        }
        Ref::Head | Ref::HeadRelative(_) => {
            Err(StorageError::integrity_violation(
                "cannot archive against a relative ref; use a concrete ref label",
            ))
        }
    }
}

fn prefixed(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::{DepType, EntityKind};

    fn sample_entity(name: &str, file: &str, line: u32) -> Entity {
        Entity::new(
            file.to_string(),
            EntityKind::Function,
            name.to_string(),
            line,
            None,
            "rust".to_string(),
            format!("fn {name}()"),
            "",
        )
    }

    #[test]
    fn upsert_then_get_roundtrips() {
        let store = SqliteStore::in_memory().unwrap();
        let e = sample_entity("foo", "src/lib.rs", 1);
        let id = e.id.clone();
        store.upsert_entity(&e).unwrap();
        let fetched = store.get_entity(&id).unwrap();
        assert_eq!(fetched.name, "foo");
        assert_eq!(fetched.status, Status::Active);
    }

    #[test]
    fn get_missing_entity_errors_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store.get_entity("missing").unwrap_err();
        assert_eq!(err.kind, cx_domain::ErrorKind::NotFound);
    }

    #[test]
    fn query_entities_filters_by_kind_and_status() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let b = sample_entity("b", "src/b.rs", 1);
        let a_id = a.id.clone();
        store.bulk_upsert(&[a, b]).unwrap();
        store.archive(&[a_id], &Ref::Tag("v1".to_string())).unwrap();

        let active = store
            .query_entities(&EntityFilter { status: Some(Status::Active), ..Default::default() }, None)
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "b");
    }

    #[test]
    fn dependencies_round_trip_both_directions() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let b = sample_entity("b", "src/b.rs", 1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.bulk_upsert(&[a, b]).unwrap();
        store
            .upsert_dependency(&Dependency {
                from_id: a_id.clone(),
                to_id: b_id.clone(),
                dep_type: DepType::Calls,
            })
            .unwrap();
        assert_eq!(store.get_dependencies_from(&a_id).unwrap().len(), 1);
        assert_eq!(store.get_dependencies_to(&b_id).unwrap().len(), 1);
        assert_eq!(store.get_all_dependencies().unwrap().len(), 1);
    }

    #[test]
    fn search_entities_ranks_by_combined_score() {
        let store = SqliteStore::in_memory().unwrap();
        let mut a = sample_entity("parse_config", "src/a.rs", 1);
        a.doc_comment = Some("parses configuration files".to_string());
        let a_id = a.id.clone();
        let mut b = sample_entity("parse_args", "src/b.rs", 1);
        b.doc_comment = Some("parses cli arguments".to_string());
        store.bulk_upsert(&[a, b]).unwrap();
        store
            .save_metrics(&Metrics { entity_id: a_id, pagerank: 0.05, in_degree: 3, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() })
            .unwrap();

        let hits = store.search_entities("parse", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity.name, "parse_config");
    }

    #[test]
    fn archive_then_restore_roundtrips_status() {
        let store = SqliteStore::in_memory().unwrap();
        let e = sample_entity("a", "src/a.rs", 1);
        let id = e.id.clone();
        store.upsert_entity(&e).unwrap();
        store.archive(std::slice::from_ref(&id), &Ref::Tag("v1".to_string())).unwrap();
        assert_eq!(store.get_entity(&id).unwrap().status, Status::Archived);
        store.restore(std::slice::from_ref(&id)).unwrap();
        assert_eq!(store.get_entity(&id).unwrap().status, Status::Active);
    }

    #[test]
    fn query_entities_at_excludes_not_yet_created_and_archived() {
        let store = SqliteStore::in_memory().unwrap();
        let mut e = sample_entity("a", "src/a.rs", 1);
        e.first_seen_ref = Some("v1".to_string());
        let id = e.id.clone();
        store.upsert_entity(&e).unwrap();
        register_ref(&store.conn.lock().unwrap(), &Ref::Tag("v1".to_string())).unwrap();
        store.archive(&[id], &Ref::Tag("v2".to_string())).unwrap();

        let at_v1 = store.query_entities_at(&EntityFilter::default(), &Ref::Tag("v1".to_string())).unwrap();
        assert_eq!(at_v1.len(), 1);
        let at_v2 = store.query_entities_at(&EntityFilter::default(), &Ref::Tag("v2".to_string())).unwrap();
        assert_eq!(at_v2.len(), 0);
    }

    #[test]
    fn top_by_pagerank_orders_descending() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let b = sample_entity("b", "src/b.rs", 1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.bulk_upsert(&[a, b]).unwrap();
        store.save_bulk_metrics(&[
            Metrics { entity_id: a_id, pagerank: 0.01, in_degree: 1, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() },
            Metrics { entity_id: b_id, pagerank: 0.2, in_degree: 1, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() },
        ]).unwrap();
        let top = store.get_top_by_pagerank(1).unwrap();
        assert_eq!(top[0].name, "b");
    }

    #[test]
    fn dangling_dependency_endpoint_is_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let a_id = a.id.clone();
        store.upsert_entity(&a).unwrap();

        let err = store
            .upsert_dependency(&Dependency { from_id: a_id, to_id: "missing-entity".to_string(), dep_type: DepType::Calls })
            .unwrap_err();
        assert_eq!(err.kind, cx_domain::ErrorKind::IntegrityViolation);
        assert_eq!(store.get_all_dependencies().unwrap().len(), 0);
    }

    #[test]
    fn bulk_upsert_deps_rejects_any_dangling_endpoint_atomically() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let b = sample_entity("b", "src/b.rs", 1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.bulk_upsert(&[a, b]).unwrap();

        let err = store
            .bulk_upsert_deps(&[
                Dependency { from_id: a_id.clone(), to_id: b_id.clone(), dep_type: DepType::Calls },
                Dependency { from_id: a_id, to_id: "missing-entity".to_string(), dep_type: DepType::UsesType },
            ])
            .unwrap_err();
        assert_eq!(err.kind, cx_domain::ErrorKind::IntegrityViolation);
        assert_eq!(store.get_all_dependencies().unwrap().len(), 0);
    }

    #[test]
    fn stats_report_counts() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_entity("a", "src/a.rs", 1);
        let b = sample_entity("b", "src/b.rs", 1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.bulk_upsert(&[a, b]).unwrap();
        store.upsert_dependency(&Dependency { from_id: a_id, to_id: b_id, dep_type: DepType::Calls }).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.total_dependencies, 1);
        assert_eq!(stats.total_files, 2);
    }
}
