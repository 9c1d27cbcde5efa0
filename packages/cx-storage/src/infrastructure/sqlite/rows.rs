//! Row <-> domain-type mapping. Kept in one place instead of inlined at
//! every call site so every query shares the same column list and row
//! closures.

use chrono::{DateTime, TimeZone, Utc};
use cx_domain::{DepType, Entity, EntityKind, Metrics, Param, Status, Visibility};
use rusqlite::Row;

use crate::error::{Result, StorageError};

pub fn kind_to_str(kind: EntityKind) -> &'static str {
    kind.as_str()
}

pub fn kind_from_str(s: &str) -> Result<EntityKind> {
    Ok(match s {
        "function" => EntityKind::Function,
        "method" => EntityKind::Method,
        "type" => EntityKind::Type,
        "struct" => EntityKind::Struct,
        "interface" => EntityKind::Interface,
        "class" => EntityKind::Class,
        "enum" => EntityKind::Enum,
        "trait" => EntityKind::Trait,
        "constant" => EntityKind::Constant,
        "variable" => EntityKind::Variable,
        "import" => EntityKind::Import,
        "package" => EntityKind::Package,
        "module" => EntityKind::Module,
        "record" => EntityKind::Record,
        other => return Err(StorageError::new(cx_domain::ErrorKind::Internal, format!("unknown kind {other}"))),
    })
}

pub fn visibility_to_str(v: Visibility) -> &'static str {
    match v {
        Visibility::Pub => "pub",
        Visibility::Priv => "priv",
        Visibility::Internal => "internal",
        Visibility::Unknown => "unknown",
    }
}

pub fn visibility_from_str(s: &str) -> Visibility {
    match s {
        "pub" => Visibility::Pub,
        "priv" => Visibility::Priv,
        "internal" => Visibility::Internal,
        _ => Visibility::Unknown,
    }
}

pub fn status_to_str(s: Status) -> &'static str {
    match s {
        Status::Active => "active",
        Status::Archived => "archived",
    }
}

pub fn status_from_str(s: &str) -> Status {
    match s {
        "archived" => Status::Archived,
        _ => Status::Active,
    }
}

pub fn dep_type_to_str(d: DepType) -> &'static str {
    d.as_str()
}

pub fn dep_type_from_str(s: &str) -> Result<DepType> {
    Ok(match s {
        "calls" => DepType::Calls,
        "uses_type" => DepType::UsesType,
        "implements" => DepType::Implements,
        "extends" => DepType::Extends,
        "imports" => DepType::Imports,
        "references" => DepType::References,
        "related" => DepType::Related,
        "discovered-from" => DepType::DiscoveredFrom,
        "blocks" => DepType::Blocks,
        other => return Err(StorageError::new(cx_domain::ErrorKind::Internal, format!("unknown dep_type {other}"))),
    })
}

pub const ENTITY_COLUMNS: &str = "id, name, qualified_name, kind, file_path, line_start, line_end, \
     language, signature, sig_hash, body_hash, doc_comment, visibility, params, status, \
     first_seen_ref, last_seen_ref";

pub fn entity_from_row(row: &Row) -> rusqlite::Result<Entity> {
    let kind_str: String = row.get(3)?;
    let visibility_str: String = row.get(12)?;
    let params_str: String = row.get(13)?;
    let status_str: String = row.get(14)?;
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        qualified_name: row.get(2)?,
        kind: kind_from_str(&kind_str).unwrap_or(EntityKind::Variable),
        file_path: row.get(4)?,
        line_start: row.get(5)?,
        line_end: row.get(6)?,
        language: row.get(7)?,
        signature: row.get(8)?,
        sig_hash: row.get(9)?,
        body_hash: row.get(10)?,
        doc_comment: row.get(11)?,
        visibility: visibility_from_str(&visibility_str),
        params: serde_json::from_str::<Vec<Param>>(&params_str).unwrap_or_default(),
        status: status_from_str(&status_str),
        first_seen_ref: row.get(15)?,
        last_seen_ref: row.get(16)?,
    })
}

pub const METRICS_COLUMNS: &str = "entity_id, pagerank, in_degree, out_degree, betweenness, computed_at";

pub fn metrics_from_row(row: &Row) -> rusqlite::Result<Metrics> {
    let computed_at_str: String = row.get(5)?;
    let computed_at = parse_timestamp(&computed_at_str);
    Ok(Metrics {
        entity_id: row.get(0)?,
        pagerank: row.get(1)?,
        in_degree: row.get(2)?,
        out_degree: row.get(3)?,
        betweenness: row.get(4)?,
        computed_at,
    })
}

/// ISO-8601 second precision in, `DateTime<Utc>` out; zero/absent becomes
/// "now".
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    if dt.timestamp() <= 0 {
        return Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    }
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

pub fn now_truncated() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap()
}
