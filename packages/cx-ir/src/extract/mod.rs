//! Entry point for turning a file's source text into extracted entities.
//! Dispatches to the tree-sitter walker where a grammar is available and
//! falls back to the regex-based extractor otherwise.

pub mod generic;
pub mod node_tables;
pub mod treesitter;

use tracing::debug;

use crate::ast::{ExtractedFile, Language};
use crate::errors::Result;

pub fn extract_file(file_path: &str, source: &str, language: Language) -> Result<ExtractedFile> {
    let extracted = if treesitter::supports(language) {
        treesitter::extract(file_path, source, language)?
    } else {
        generic::extract(file_path, source, language)?
    };
    debug!(
        "extracted {} entities and {} local edges from {}",
        extracted.entities.len(),
        extracted.local_edges.len(),
        file_path
    );
    Ok(extracted)
}
