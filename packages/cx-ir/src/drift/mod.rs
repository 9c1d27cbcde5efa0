//! Semantic-diff engine: compares on-disk entities against a stored
//! snapshot (Mode A, `analyze_modified_file`) or between two stored refs
//! (Mode B, `gather_changes`), classifies each change, and enriches breaking
//! changes with the callers a structural edit would affect.

pub mod analyze;
pub mod broken;
pub mod compare;
pub mod recommend;

use cx_domain::Ref;
use cx_storage::domain::Store;
use serde::{Deserialize, Serialize};

pub use analyze::{analyze_missing_file, analyze_modified_file};
pub use broken::discover_broken_dependencies;
pub use compare::gather_changes;
pub use recommend::recommend;

use crate::config::DriftConfig;
use crate::errors::Result;

/// How a single entity changed between two snapshots (or disk vs. store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    Added,
    Removed,
    SignatureChange,
    BodyChange,
    FileMissing,
    Modified,
}

/// One classified change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEntry {
    pub entity_id: String,
    pub name: String,
    pub file_path: String,
    pub kind: DriftKind,
    pub breaking: bool,
    pub old_signature: Option<String>,
    pub new_signature: Option<String>,
    /// Up to the first 5 distinct caller names, populated for non-`added`
    /// changes from `calls` dependencies targeting the stored entity.
    pub affected_callers: Vec<String>,
}

/// Overall status derived from a `DriftSummary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    Ok,
    Drifted,
    Errored,
}

/// Aggregate counts over a set of `DriftEntry` plus derived status,
/// warnings, and recommendations — the user-visible failure/success shape
/// from spec §7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftSummary {
    pub status: DriftStatus,
    pub total: usize,
    pub breaking_changes: usize,
    pub new_entities: usize,
    pub missing_entities: usize,
    pub signature_changes: usize,
    pub body_changes: usize,
    pub total_affected_callers: usize,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DriftSummary {
    /// Fold a list of classified entries (plus any parse warnings collected
    /// along the way) into the aggregate summary, including recommendations.
    pub fn summarize(entries: &[DriftEntry], warnings: Vec<String>) -> Self {
        let total = entries.len();
        let breaking_changes = entries.iter().filter(|e| e.breaking).count();
        let new_entities = entries.iter().filter(|e| e.kind == DriftKind::Added).count();
        let missing_entities = entries
            .iter()
            .filter(|e| matches!(e.kind, DriftKind::Removed | DriftKind::FileMissing))
            .count();
        let signature_changes = entries.iter().filter(|e| e.kind == DriftKind::SignatureChange).count();
        let body_changes = entries.iter().filter(|e| e.kind == DriftKind::BodyChange).count();
        let total_affected_callers = entries.iter().map(|e| e.affected_callers.len()).sum();

        let status = if !warnings.is_empty() && total == 0 {
            DriftStatus::Errored
        } else if total == 0 {
            DriftStatus::Ok
        } else {
            DriftStatus::Drifted
        };

        let recommendations = recommend(
            status,
            breaking_changes,
            signature_changes,
            total_affected_callers,
            missing_entities,
            new_entities,
            body_changes,
        );

        Self {
            status,
            total,
            breaking_changes,
            new_entities,
            missing_entities,
            signature_changes,
            body_changes,
            total_affected_callers,
            warnings,
            recommendations,
        }
    }
}

/// Between-refs change record (Mode B), keyed by entity id rather than
/// name — both snapshots are already resolved store rows, so no alignment
/// ambiguity exists the way Mode A's name-only alignment has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefDrift {
    pub entity_id: String,
    pub name: String,
    pub file_path: String,
    pub from_ref: String,
    pub to_ref: String,
    pub kind: DriftKind,
}

fn ref_label(r: &Ref) -> String {
    r.to_string()
}

/// The full Mode A report for one file: classified entries, the derived
/// summary (status/warnings/recommendations), and the batch-wide broken
/// dependency list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
    pub summary: DriftSummary,
    pub broken_dependencies: Vec<String>,
}

/// Run Mode A end to end for a single file: classify, summarize, and
/// resolve the batch's broken-dependency list. Per-file parse failures are
/// the caller's concern (they call this per file and collect warnings); a
/// failure here is a genuine I/O or unsupported-language error.
pub fn analyze_and_report(store: &dyn Store, path: &str, config: &DriftConfig) -> Result<DriftReport> {
    let entries = analyze_modified_file(store, path, config)?;
    let broken_dependencies = discover_broken_dependencies(store, &entries, config.broken_dependency_cap)?;
    let summary = DriftSummary::summarize(&entries, Vec::new());
    Ok(DriftReport { entries, summary, broken_dependencies })
}
