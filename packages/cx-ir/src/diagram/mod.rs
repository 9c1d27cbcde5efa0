//! Diagram Assembler: builds `DiagramEntity`/`DiagramEdge` collections from
//! a `Store` + `DependencyGraph` under a `DiagramConfig` preset, then
//! renders deterministic Mermaid source. Rendering is the only serialized
//! output format this crate owns directly — report YAML/JSON assembly is
//! the named-but-excluded CLI surface (spec §1).

pub mod assemble;
pub mod changes;
pub mod config;
pub mod render;

pub use assemble::{assemble, assemble_call_flow, assemble_caller_flow};
pub use changes::assemble_changes;
pub use config::{DiagramConfig, DiagramDirection, DiagramType};
pub use render::render_mermaid;

use serde::{Deserialize, Serialize};

/// One node in an assembled diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagramEntity {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub file_path: String,
    /// `None` unless the preset groups nodes into module containers.
    pub container: Option<String>,
    pub importance: Option<String>,
    /// Present only for the coverage preset.
    pub coverage_percent: Option<f64>,
    /// Marks the call-flow/caller-flow root for emphasis.
    pub is_root: bool,
    /// Color code (green/yellow/red), set only by the changes preset.
    pub color: Option<String>,
}

/// One edge in an assembled diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    pub dep_type: String,
}

/// The full assembled diagram, ready for `render_mermaid` or direct
/// serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagram {
    pub title: String,
    pub diagram_type: DiagramType,
    pub entities: Vec<DiagramEntity>,
    pub edges: Vec<DiagramEdge>,
    /// Node ids dropped to honor `max_nodes`, most-important-first ranking
    /// already applied — recorded so truncation is never silent.
    pub truncated_count: usize,
}
