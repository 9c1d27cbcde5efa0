//! AST facade: language identification plus the extracted-file shape that
//! every per-language extractor in `extract` produces.

use cx_domain::Entity;

use crate::errors::{IrError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Go,
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Java,
    CSharp,
    C,
    Cpp,
    Php,
    Kotlin,
    Ruby,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
            Language::Ruby => "ruby",
        }
    }

    /// Identify a language from a file path's extension. Unknown extensions
    /// return `None` — silently ignored by the scanner, not an error.
    pub fn identify(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?.to_lowercase();
        Some(match ext.as_str() {
            "go" => Language::Go,
            "ts" | "tsx" => Language::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "py" | "pyi" => Language::Python,
            "rs" => Language::Rust,
            "java" => Language::Java,
            "cs" => Language::CSharp,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "php" => Language::Php,
            "kt" | "kts" => Language::Kotlin,
            "rb" | "rake" => Language::Ruby,
            _ => return None,
        })
    }

    /// `identify`, but failing with `UnsupportedLanguage` instead of `None`
    /// — used by code paths (Drift Mode A) that must parse a named file.
    pub fn identify_or_err(path: &str) -> Result<Self> {
        Self::identify(path).ok_or_else(|| {
            let ext = path.rsplit('.').next().unwrap_or("").to_string();
            IrError::unsupported_language(ext)
        })
    }
}

/// One matched entity plus the within-file dependency candidates discovered
/// while walking its subtree (resolved identifier references, not yet
/// matched against cross-file entity ids).
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub entities: Vec<Entity>,
    /// (from_name, to_name, dep_type) — resolved to ids once the whole
    /// project's entity table is known.
    pub local_edges: Vec<(String, String, cx_domain::DepType)>,
}

impl ExtractedFile {
    pub fn empty() -> Self {
        Self { entities: Vec::new(), local_edges: Vec::new() }
    }
}
