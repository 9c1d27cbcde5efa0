//! `SqliteCache`: concrete `Cache` implementation over `cache.db`.
//!
//! Deliberately a thin, detached twin of `SqliteStore`'s metrics handling —
//! separate file, separate connection, no FTS, no dependency graph.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use cx_domain::Metrics;
use rusqlite::{params, Connection, OptionalExtension};

use super::rows::{format_timestamp, metrics_from_row, now_truncated, METRICS_COLUMNS};
use super::schema::init_cache_schema;
use crate::domain::Cache;
use crate::error::Result;

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_cache_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_cache_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl Cache for SqliteCache {
    fn set_file_scanned(&self, path: &str, hash: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO file_index (file_path, scan_hash, scanned_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(file_path) DO UPDATE SET scan_hash=excluded.scan_hash, scanned_at=excluded.scanned_at",
            params![path, hash, format_timestamp(&now_truncated())],
        )?;
        Ok(())
    }

    fn get_file_hash(&self, path: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT scan_hash FROM file_index WHERE file_path = ?1",
            params![path],
            |r| r.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    fn is_file_changed(&self, path: &str, new_hash: &str) -> Result<bool> {
        let existing = self.get_file_hash(path)?;
        Ok(existing.as_deref() != Some(new_hash))
    }

    fn get_changed_files(&self, candidates: &HashMap<String, String>) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for (path, hash) in candidates {
            if self.is_file_changed(path, hash)? {
                out.push(path.clone());
            }
        }
        out.sort();
        Ok(out)
    }

    fn prune_stale_entries(&self, valid_paths: &HashSet<String>) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT file_path FROM file_index")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut stale = Vec::new();
        for row in rows {
            let path = row?;
            if !valid_paths.contains(&path) {
                stale.push(path);
            }
        }
        drop(stmt);
        for path in &stale {
            conn.execute("DELETE FROM file_index WHERE file_path = ?1", params![path])?;
        }
        Ok(stale.len())
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
        .map_err(Into::into)
    }

    fn get_top_by_pagerank(&self, n: usize) -> Result<Vec<Metrics>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {METRICS_COLUMNS} FROM metrics ORDER BY pagerank DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![n as i64], metrics_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_keystones(&self, threshold: f64) -> Result<Vec<Metrics>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {METRICS_COLUMNS} FROM metrics WHERE pagerank >= ?1 ORDER BY pagerank DESC"
        ))?;
        let rows = stmt.query_map(params![threshold], metrics_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_bottlenecks(&self, threshold: u32) -> Result<Vec<Metrics>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {METRICS_COLUMNS} FROM metrics WHERE in_degree >= ?1 ORDER BY in_degree DESC"
        ))?;
        let rows = stmt.query_map(params![threshold], metrics_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_all_metrics(&self) -> Result<Vec<Metrics>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT {METRICS_COLUMNS} FROM metrics"))?;
        let rows = stmt.query_map([], metrics_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn delete_metrics(&self, entity_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM metrics WHERE entity_id = ?1", params![entity_id])?;
        Ok(())
    }

    fn clear_metrics(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM metrics", [])?;
        Ok(())
    }

    fn clear_file_index(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM file_index", [])?;
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_file_reports_changed() {
        let cache = SqliteCache::in_memory().unwrap();
        assert!(cache.is_file_changed("src/lib.rs", "abc").unwrap());
    }

    #[test]
    fn scanned_file_with_same_hash_is_unchanged() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_file_scanned("src/lib.rs", "abc").unwrap();
        assert!(!cache.is_file_changed("src/lib.rs", "abc").unwrap());
        assert!(cache.is_file_changed("src/lib.rs", "def").unwrap());
    }

    #[test]
    fn get_changed_files_returns_only_changed_subset() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_file_scanned("a.rs", "h1").unwrap();
        cache.set_file_scanned("b.rs", "h2").unwrap();
        let mut candidates = HashMap::new();
        candidates.insert("a.rs".to_string(), "h1".to_string());
        candidates.insert("b.rs".to_string(), "h2-changed".to_string());
        candidates.insert("c.rs".to_string(), "h3".to_string());
        let mut changed = cache.get_changed_files(&candidates).unwrap();
        changed.sort();
        assert_eq!(changed, vec!["b.rs".to_string(), "c.rs".to_string()]);
    }

    #[test]
    fn prune_stale_entries_removes_missing_paths() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_file_scanned("a.rs", "h1").unwrap();
        cache.set_file_scanned("b.rs", "h2").unwrap();
        let mut valid = HashSet::new();
        valid.insert("a.rs".to_string());
        let pruned = cache.prune_stale_entries(&valid).unwrap();
        assert_eq!(pruned, 1);
        assert!(cache.get_file_hash("b.rs").unwrap().is_none());
        assert!(cache.get_file_hash("a.rs").unwrap().is_some());
    }

    #[test]
    fn keystones_and_bottlenecks_filter_by_threshold() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.save_bulk_metrics(&[
            Metrics { entity_id: "a".to_string(), pagerank: 0.02, in_degree: 20, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() },
            Metrics { entity_id: "b".to_string(), pagerank: 0.001, in_degree: 2, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() },
        ]).unwrap();
        assert_eq!(cache.get_keystones(0.01).unwrap().len(), 1);
        assert_eq!(cache.get_bottlenecks(10).unwrap().len(), 1);
    }

    #[test]
    fn clear_metrics_and_file_index_empty_tables() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_file_scanned("a.rs", "h1").unwrap();
        cache.save_metrics(&Metrics { entity_id: "a".to_string(), pagerank: 0.1, in_degree: 1, out_degree: 1, betweenness: 0.0, computed_at: chrono::Utc::now() }).unwrap();
        cache.clear_file_index().unwrap();
        cache.clear_metrics().unwrap();
        assert!(cache.get_file_hash("a.rs").unwrap().is_none());
        assert!(cache.get_metrics("a").unwrap().is_none());
    }
}
