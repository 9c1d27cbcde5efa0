//! `store.db` schema and migration entrypoint.

use rusqlite::Connection;

use crate::error::Result;

pub fn init_store_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS entities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            qualified_name TEXT NOT NULL,
            kind TEXT NOT NULL,
            file_path TEXT NOT NULL,
            line_start INTEGER NOT NULL,
            line_end INTEGER,
            language TEXT NOT NULL,
            signature TEXT NOT NULL,
            sig_hash TEXT NOT NULL,
            body_hash TEXT NOT NULL,
            doc_comment TEXT,
            visibility TEXT NOT NULL,
            params TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL,
            first_seen_ref TEXT,
            last_seen_ref TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_entities_name ON entities(name);
        CREATE INDEX IF NOT EXISTS idx_entities_file_status ON entities(file_path, status);
        CREATE INDEX IF NOT EXISTS idx_entities_kind_status ON entities(kind, status);
        CREATE INDEX IF NOT EXISTS idx_entities_language ON entities(language);

        CREATE TABLE IF NOT EXISTS dependencies (
            from_id TEXT NOT NULL REFERENCES entities(id),
            to_id TEXT NOT NULL REFERENCES entities(id),
            dep_type TEXT NOT NULL,
            PRIMARY KEY (from_id, to_id, dep_type)
        );
        CREATE INDEX IF NOT EXISTS idx_deps_from ON dependencies(from_id);
        CREATE INDEX IF NOT EXISTS idx_deps_to ON dependencies(to_id);

        CREATE VIRTUAL TABLE IF NOT EXISTS entities_fts USING fts5(
            id UNINDEXED,
            name,
            qualified_name,
            doc_comment,
            signature
        );

        CREATE TABLE IF NOT EXISTS metrics (
            entity_id TEXT PRIMARY KEY,
            pagerank REAL NOT NULL,
            in_degree INTEGER NOT NULL,
            out_degree INTEGER NOT NULL,
            betweenness REAL NOT NULL,
            computed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entity_coverage (
            entity_id TEXT PRIMARY KEY,
            coverage_percent REAL NOT NULL,
            covered_lines INTEGER NOT NULL,
            uncovered_lines INTEGER NOT NULL,
            last_run TEXT
        );

        CREATE TABLE IF NOT EXISTS scan_refs (
            ref_label TEXT PRIMARY KEY,
            seq INTEGER NOT NULL UNIQUE
        );
        ",
    )?;
    Ok(())
}

pub fn init_cache_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;

        CREATE TABLE IF NOT EXISTS file_index (
            file_path TEXT PRIMARY KEY,
            scan_hash TEXT NOT NULL,
            scanned_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS metrics (
            entity_id TEXT PRIMARY KEY,
            pagerank REAL NOT NULL,
            in_degree INTEGER NOT NULL,
            out_degree INTEGER NOT NULL,
            betweenness REAL NOT NULL,
            computed_at TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}
