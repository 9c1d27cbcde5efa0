//! Core data model: Entity, Dependency, Metrics, FileEntry.

use crate::hash::{body_hash as compute_body_hash, short_hash, sig_hash as compute_sig_hash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Function,
    Method,
    Type,
    Struct,
    Interface,
    Class,
    Enum,
    Trait,
    Constant,
    Variable,
    Import,
    Package,
    Module,
    Record,
}

impl EntityKind {
    /// Short id prefix, e.g. `fn`, `mth`, `ty`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Function => "fn",
            EntityKind::Method => "mth",
            EntityKind::Type => "ty",
            EntityKind::Struct => "sct",
            EntityKind::Interface => "ifc",
            EntityKind::Class => "cls",
            EntityKind::Enum => "enm",
            EntityKind::Trait => "trt",
            EntityKind::Constant => "const",
            EntityKind::Variable => "var",
            EntityKind::Import => "imp",
            EntityKind::Package => "pkg",
            EntityKind::Module => "mod",
            EntityKind::Record => "rec",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Type => "type",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Trait => "trait",
            EntityKind::Constant => "constant",
            EntityKind::Variable => "variable",
            EntityKind::Import => "import",
            EntityKind::Package => "package",
            EntityKind::Module => "module",
            EntityKind::Record => "record",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Pub,
    Priv,
    Internal,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub type_text: String,
}

/// The atomic unit of the code graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub qualified_name: String,
    pub kind: EntityKind,
    pub file_path: String,
    pub line_start: u32,
    pub line_end: Option<u32>,
    pub language: String,
    pub signature: String,
    pub sig_hash: String,
    pub body_hash: String,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub status: Status,
    pub first_seen_ref: Option<String>,
    pub last_seen_ref: Option<String>,
}

impl Entity {
    /// `<prefix>-<12-hex>-<line>-<name>`, collision-free within a snapshot
    /// because `(file_path, kind, name, line_start)` is folded into the
    /// hash input.
    pub fn generate_id(file_path: &str, kind: EntityKind, name: &str, line_start: u32) -> String {
        let input = format!("{file_path}\0{}\0{name}\0{line_start}", kind.as_str());
        format!("{}-{}-{}-{}", kind.id_prefix(), short_hash(&input), line_start, name)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_path: impl Into<String>,
        kind: EntityKind,
        name: impl Into<String>,
        line_start: u32,
        line_end: Option<u32>,
        language: impl Into<String>,
        signature: impl Into<String>,
        body: &str,
    ) -> Self {
        let file_path = file_path.into();
        let name = name.into();
        let signature = signature.into();
        let id = Self::generate_id(&file_path, kind, &name, line_start);
        Self {
            id,
            qualified_name: name.clone(),
            name,
            kind,
            file_path,
            line_start,
            line_end,
            language: language.into(),
            sig_hash: compute_sig_hash(&signature),
            body_hash: compute_body_hash(body),
            signature,
            doc_comment: None,
            visibility: Visibility::Unknown,
            params: Vec::new(),
            status: Status::Active,
            first_seen_ref: None,
            last_seen_ref: None,
        }
    }
}

/// Directed edge kind between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    Calls,
    UsesType,
    Implements,
    Extends,
    Imports,
    References,
    Related,
    DiscoveredFrom,
    Blocks,
}

impl DepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepType::Calls => "calls",
            DepType::UsesType => "uses_type",
            DepType::Implements => "implements",
            DepType::Extends => "extends",
            DepType::Imports => "imports",
            DepType::References => "references",
            DepType::Related => "related",
            DepType::DiscoveredFrom => "discovered-from",
            DepType::Blocks => "blocks",
        }
    }

    /// True for edges that participate in the dependency graph; metadata
    /// edges (related/discovered-from/blocks) are not traversed during
    /// structural analysis.
    pub fn is_code_dependency(&self) -> bool {
        matches!(
            self,
            DepType::Calls
                | DepType::UsesType
                | DepType::Implements
                | DepType::Extends
                | DepType::Imports
                | DepType::References
        )
    }
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from_id: String,
    pub to_id: String,
    pub dep_type: DepType,
}

impl Dependency {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, dep_type: DepType) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            dep_type,
        }
    }
}

/// One row per entity; the store upserts rather than appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub entity_id: String,
    pub pagerank: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub betweenness: f64,
    pub computed_at: DateTime<Utc>,
}

/// Importance classification derived from `Metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Keystone,
    Bottleneck,
    HighFanOut,
    Leaf,
    Normal,
}

impl Importance {
    pub fn classify(m: &Metrics) -> Self {
        if m.pagerank >= 0.01 {
            Importance::Keystone
        } else if m.in_degree >= 10 {
            Importance::Bottleneck
        } else if m.out_degree >= 15 {
            Importance::HighFanOut
        } else if m.in_degree == 0 {
            Importance::Leaf
        } else {
            Importance::Normal
        }
    }
}

/// Cache row tracking whether a file needs re-extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_path: String,
    pub scan_hash: String,
    pub scanned_at: DateTime<Utc>,
}

/// Filter combination accepted by `Store::query_entities`.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    pub name: Option<String>,
    pub file_path: Option<String>,
    pub kind: Option<EntityKind>,
    pub language: Option<String>,
    pub status: Option<Status>,
}

/// Ranked full-text search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub entity: Entity,
    pub fts_score: f64,
    pub pagerank: f64,
    pub combined_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_is_deterministic() {
        let a = Entity::generate_id("a.go", EntityKind::Function, "Foo", 10);
        let b = Entity::generate_id("a.go", EntityKind::Function, "Foo", 10);
        assert_eq!(a, b);
        assert!(a.starts_with("fn-"));
        assert!(a.ends_with("-10-Foo"));
    }

    #[test]
    fn entity_id_differs_by_line() {
        let a = Entity::generate_id("a.go", EntityKind::Function, "Foo", 10);
        let b = Entity::generate_id("a.go", EntityKind::Function, "Foo", 20);
        assert_ne!(a, b);
    }

    #[test]
    fn dep_type_code_dependency_predicate() {
        assert!(DepType::Calls.is_code_dependency());
        assert!(DepType::References.is_code_dependency());
        assert!(!DepType::Related.is_code_dependency());
        assert!(!DepType::Blocks.is_code_dependency());
        assert!(!DepType::DiscoveredFrom.is_code_dependency());
    }

    #[test]
    fn importance_classification_order() {
        let base = Metrics {
            entity_id: "x".into(),
            pagerank: 0.0,
            in_degree: 0,
            out_degree: 0,
            betweenness: 0.0,
            computed_at: Utc::now(),
        };
        assert_eq!(
            Importance::classify(&Metrics {
                pagerank: 0.02,
                ..base.clone()
            }),
            Importance::Keystone
        );
        assert_eq!(
            Importance::classify(&Metrics {
                in_degree: 10,
                ..base.clone()
            }),
            Importance::Bottleneck
        );
        assert_eq!(
            Importance::classify(&Metrics {
                out_degree: 15,
                ..base.clone()
            }),
            Importance::HighFanOut
        );
        assert_eq!(Importance::classify(&base), Importance::Leaf);
        assert_eq!(
            Importance::classify(&Metrics {
                in_degree: 1,
                ..base
            }),
            Importance::Normal
        );
    }
}
