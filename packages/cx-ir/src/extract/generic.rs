//! Regex-based fallback extractor for languages outside this workspace's
//! tree-sitter grammar set (TypeScript, JavaScript, C#, C, C++, PHP, Kotlin,
//! Ruby). Finds top-level function/method declarations by line pattern;
//! coarser than `extract::treesitter` but never silently drops a file the
//! way skipping it entirely would.

use std::collections::HashSet;

use cx_domain::{DepType, Entity, EntityKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{ExtractedFile, Language};
use crate::errors::Result;

struct LinePattern {
    regex: &'static Lazy<Regex>,
    kind: EntityKind,
}

static TS_JS_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s+(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)\s*\(").unwrap()
});
static TS_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:export\s+)?class\s+(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)").unwrap());
static CSHARP_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:public|private|protected|internal|static|\s)+[\w<>\[\],\s]+\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\([^;]*\)\s*\{?\s*$").unwrap()
});
static CSHARP_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:public|private|internal|\s)*class\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)").unwrap());
static C_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w\*\s]+\s(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\([^;{]*\)\s*\{?\s*$").unwrap()
});
static PHP_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:public\s+|private\s+|protected\s+|static\s+)*function\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
});
static PHP_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*class\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)").unwrap());
static KOTLIN_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:private\s+|public\s+|internal\s+)?fun\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());
static KOTLIN_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:private\s+|public\s+|internal\s+)?(?:data\s+|sealed\s+)?class\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static RUBY_METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*def\s+(?P<name>[A-Za-z_][A-Za-z0-9_?!=]*)").unwrap());
static RUBY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*class\s+(?P<name>[A-Za-z_][A-Za-z0-9_:]*)").unwrap());

/// A bare identifier immediately followed by `(` — a call site, line-pattern
/// coarse as the rest of this extractor.
static CALL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());
static IDENT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

fn patterns_for(language: Language) -> Vec<LinePattern> {
    match language {
        Language::TypeScript | Language::JavaScript => vec![
            LinePattern { regex: &TS_JS_FN, kind: EntityKind::Function },
            LinePattern { regex: &TS_CLASS, kind: EntityKind::Class },
        ],
        Language::CSharp => vec![
            LinePattern { regex: &CSHARP_CLASS, kind: EntityKind::Class },
            LinePattern { regex: &CSHARP_METHOD, kind: EntityKind::Method },
        ],
        Language::C | Language::Cpp => vec![LinePattern { regex: &C_FN, kind: EntityKind::Function }],
        Language::Php => vec![
            LinePattern { regex: &PHP_CLASS, kind: EntityKind::Class },
            LinePattern { regex: &PHP_FN, kind: EntityKind::Function },
        ],
        Language::Kotlin => vec![
            LinePattern { regex: &KOTLIN_CLASS, kind: EntityKind::Class },
            LinePattern { regex: &KOTLIN_FN, kind: EntityKind::Function },
        ],
        Language::Ruby => vec![
            LinePattern { regex: &RUBY_CLASS, kind: EntityKind::Class },
            LinePattern { regex: &RUBY_METHOD, kind: EntityKind::Method },
        ],
        _ => Vec::new(),
    }
}

pub fn extract(file_path: &str, source: &str, language: Language) -> Result<ExtractedFile> {
    let patterns = patterns_for(language);
    let mut out = ExtractedFile::empty();
    if patterns.is_empty() {
        return Ok(out);
    }

    let lines: Vec<&str> = source.lines().collect();
    let mut bodies: Vec<(String, EntityKind, String)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        for pattern in &patterns {
            if let Some(caps) = pattern.regex.captures(line) {
                let name = caps.name("name").unwrap().as_str().to_string();
                let line_start = idx as u32 + 1;
                let body = brace_delimited_body(&lines, idx);
                let entity = Entity::new(
                    file_path.replace('\\', "/"),
                    pattern.kind,
                    name.clone(),
                    line_start,
                    None,
                    language.as_str(),
                    line.trim().to_string(),
                    &body,
                );
                out.entities.push(entity);
                bodies.push((name, pattern.kind, body));
                break;
            }
        }
    }
    collect_local_edges(&bodies, &mut out.local_edges);
    Ok(out)
}

/// Resolves call/type tokens inside each captured body against the other
/// names this file declared. Same in-file-only contract as
/// `extract::treesitter`: a token this file doesn't declare is silently
/// dropped rather than guessed at.
fn collect_local_edges(bodies: &[(String, EntityKind, String)], out: &mut Vec<(String, String, DepType)>) {
    let callable_names: HashSet<&str> = bodies
        .iter()
        .filter(|(_, kind, _)| matches!(kind, EntityKind::Function | EntityKind::Method))
        .map(|(name, _, _)| name.as_str())
        .collect();
    let type_names: HashSet<&str> =
        bodies.iter().filter(|(_, kind, _)| matches!(kind, EntityKind::Class)).map(|(name, _, _)| name.as_str()).collect();

    if callable_names.is_empty() && type_names.is_empty() {
        return;
    }

    for (from, _, body) in bodies {
        for caps in CALL_TOKEN.captures_iter(body) {
            let callee = &caps["name"];
            if callee != from && callable_names.contains(callee) {
                push_local_edge(out, from, callee, DepType::Calls);
            }
        }
        for m in IDENT_TOKEN.find_iter(body) {
            let name = m.as_str();
            if name != from && type_names.contains(name) {
                push_local_edge(out, from, name, DepType::UsesType);
            }
        }
    }
}

fn push_local_edge(out: &mut Vec<(String, String, DepType)>, from: &str, to: &str, dep_type: DepType) {
    if out.iter().any(|(f, t, d)| f == from && t == to && *d == dep_type) {
        return;
    }
    out.push((from.to_string(), to.to_string(), dep_type));
}

/// Best-effort body capture: from the declaration line to the line whose
/// running brace balance returns to zero. Good enough for body-hash
/// sensitivity; not a real parser.
fn brace_delimited_body(lines: &[&str], start: usize) -> String {
    let mut depth = 0i32;
    let mut seen_open = false;
    let mut out = Vec::new();
    for line in &lines[start..] {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        out.push(*line);
        if seen_open && depth <= 0 {
            break;
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_typescript_function_and_class() {
        let source = "export function add(a: number, b: number): number {\n  return a + b;\n}\n\nexport class Widget {\n}\n";
        let extracted = extract("a.ts", source, Language::TypeScript).unwrap();
        assert!(extracted.entities.iter().any(|e| e.name == "add" && e.kind == EntityKind::Function));
        assert!(extracted.entities.iter().any(|e| e.name == "Widget" && e.kind == EntityKind::Class));
    }

    #[test]
    fn extracts_ruby_method() {
        let source = "class Greeter\n  def hello(name)\n    name\n  end\nend\n";
        let extracted = extract("a.rb", source, Language::Ruby).unwrap();
        assert!(extracted.entities.iter().any(|e| e.name == "Greeter" && e.kind == EntityKind::Class));
        assert!(extracted.entities.iter().any(|e| e.name == "hello" && e.kind == EntityKind::Method));
    }

    #[test]
    fn unsupported_language_yields_no_entities_not_error() {
        let extracted = extract("a.rs", "fn x() {}", Language::Rust).unwrap();
        assert!(extracted.entities.is_empty());
    }

    #[test]
    fn typescript_call_within_file_becomes_local_edge() {
        let source = "function helper() {\n  return 1;\n}\n\nfunction main() {\n  helper();\n}\n";
        let extracted = extract("a.ts", source, Language::TypeScript).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("main".to_string(), "helper".to_string(), cx_domain::DepType::Calls)));
    }

    #[test]
    fn call_to_undeclared_function_emits_no_edge() {
        let source = "function main() {\n  console.log(\"hi\");\n}\n";
        let extracted = extract("a.ts", source, Language::TypeScript).unwrap();
        assert!(extracted.local_edges.is_empty());
    }
}
