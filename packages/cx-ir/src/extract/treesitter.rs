//! Generic tree-sitter walker driven by a per-language node-type table.
//! One walker serves Rust/Python/Go/Java rather than four bespoke ones,
//! since all four grammars expose a `name` field on their declaration nodes.

use std::collections::HashSet;

use cx_domain::{DepType, Entity, EntityKind};
use tree_sitter::{Node, Parser, Tree};

use crate::ast::{ExtractedFile, Language};
use crate::errors::{IrError, Result};

use super::node_tables::table_for;

fn grammar_for(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Rust => Some(tree_sitter_rust::language()),
        Language::Python => Some(tree_sitter_python::language()),
        Language::Go => Some(tree_sitter_go::language()),
        Language::Java => Some(tree_sitter_java::language()),
        _ => None,
    }
}

pub fn supports(language: Language) -> bool {
    grammar_for(language).is_some()
}

pub fn parse(source: &str, language: Language) -> Result<Tree> {
    let grammar = grammar_for(language)
        .ok_or_else(|| IrError::unsupported_language(language.as_str()))?;
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| IrError::internal(format!("grammar load failed: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| IrError::parse("<buffer>", 0, 0, "tree-sitter returned no tree"))
}

pub fn extract(file_path: &str, source: &str, language: Language) -> Result<ExtractedFile> {
    let tree = parse(source, language)?;
    let table = table_for(language);
    let mut out = ExtractedFile::empty();
    walk(tree.root_node(), source, file_path, language, table, &mut out);
    collect_local_edges(tree.root_node(), source, language, table, &out.entities, &mut out.local_edges);
    Ok(out)
}

fn walk(
    node: Node,
    source: &str,
    file_path: &str,
    language: Language,
    table: &[(&'static str, EntityKind, bool)],
    out: &mut ExtractedFile,
) {
    if let Some(&(_, kind, has_body)) = table.iter().find(|(node_kind, _, _)| *node_kind == node.kind()) {
        if let Some(entity) = build_entity(node, source, file_path, language, kind, has_body) {
            out.entities.push(entity);
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, file_path, language, table, out);
    }
}

fn build_entity(
    node: Node,
    source: &str,
    file_path: &str,
    language: Language,
    kind: EntityKind,
    has_body: bool,
) -> Option<Entity> {
    let name_node = node.child_by_field_name("name")?;
    let name = text_of(name_node, source).to_string();
    let line_start = node.start_position().row as u32 + 1;
    let line_end = node.end_position().row as u32 + 1;

    let body_node = node.child_by_field_name("body");
    let signature_end = body_node.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = source[node.start_byte()..signature_end].trim().to_string();
    let body_text = if has_body {
        body_node.map(|b| text_of(b, source).to_string()).unwrap_or_default()
    } else {
        String::new()
    };

    let doc_comment = leading_comment(node, source);

    let mut entity = Entity::new(
        normalize_path(file_path),
        kind,
        name.clone(),
        line_start,
        Some(line_end),
        language.as_str(),
        signature,
        &body_text,
    );
    entity.qualified_name = name;
    entity.doc_comment = doc_comment;
    Some(entity)
}

/// Resolves call/type-reference identifiers against the entity table this
/// file just produced. Only in-file matches become edges — a reference to a
/// name this file doesn't declare is, by construction, either unresolvable
/// here or a cross-file target that a project-wide resolver would need to
/// settle; we stay silent on both rather than guess.
fn collect_local_edges(
    root: Node,
    source: &str,
    language: Language,
    table: &[(&'static str, EntityKind, bool)],
    entities: &[Entity],
    out: &mut Vec<(String, String, DepType)>,
) {
    let callable_names: HashSet<&str> = entities
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Function | EntityKind::Method))
        .map(|e| e.name.as_str())
        .collect();
    let type_names: HashSet<&str> = entities
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EntityKind::Struct | EntityKind::Enum | EntityKind::Trait | EntityKind::Class | EntityKind::Interface | EntityKind::Type
            )
        })
        .map(|e| e.name.as_str())
        .collect();

    if callable_names.is_empty() && type_names.is_empty() {
        return;
    }

    let ctx = EdgeWalkCtx { source, language, table, callable_names: &callable_names, type_names: &type_names };
    walk_edges(root, &ctx, None, out);
}

/// Read-only context threaded through `walk_edges` so the recursive walker
/// itself only carries the node and its enclosing-entity accumulator.
struct EdgeWalkCtx<'a> {
    source: &'a str,
    language: Language,
    table: &'a [(&'static str, EntityKind, bool)],
    callable_names: &'a HashSet<&'a str>,
    type_names: &'a HashSet<&'a str>,
}

fn walk_edges<'a>(node: Node<'a>, ctx: &EdgeWalkCtx<'a>, enclosing: Option<&'a str>, out: &mut Vec<(String, String, DepType)>) {
    let entered = ctx
        .table
        .iter()
        .any(|(node_kind, _, _)| *node_kind == node.kind())
        .then(|| node.child_by_field_name("name"))
        .flatten()
        .map(|n| text_of(n, ctx.source));
    let current = entered.or(enclosing);

    if let Some(from) = current {
        if let Some(callee) = call_target(node, ctx.source, ctx.language) {
            if ctx.callable_names.contains(callee.as_str()) {
                push_local_edge(out, from, &callee, DepType::Calls);
            }
        }
        if node.kind() == "type_identifier" {
            let name = text_of(node, ctx.source);
            if ctx.type_names.contains(name) {
                push_local_edge(out, from, name, DepType::UsesType);
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_edges(child, ctx, current, out);
    }
}

/// The callee identifier of a call-like node, per language. Field/selector/
/// attribute access resolves to its rightmost identifier (`self.foo()` ->
/// `foo`), matching the coarse resolution `extract::generic` already does.
fn call_target(node: Node, source: &str, language: Language) -> Option<String> {
    let (call_kind, field) = match language {
        Language::Rust | Language::Go => ("call_expression", "function"),
        Language::Python => ("call", "function"),
        Language::Java => ("method_invocation", "name"),
        _ => return None,
    };
    if node.kind() != call_kind {
        return None;
    }
    resolve_identifier(node.child_by_field_name(field)?, source)
}

fn resolve_identifier(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(text_of(node, source).to_string()),
        "generic_function" => resolve_identifier(node.child_by_field_name("function")?, source),
        "scoped_identifier" => Some(text_of(node.child_by_field_name("name")?, source).to_string()),
        "field_expression" | "selector_expression" | "field_access" => {
            Some(text_of(node.child_by_field_name("field")?, source).to_string())
        }
        "attribute" => Some(text_of(node.child_by_field_name("attribute")?, source).to_string()),
        _ => None,
    }
}

fn push_local_edge(out: &mut Vec<(String, String, DepType)>, from: &str, to: &str, dep_type: DepType) {
    if from == to {
        return;
    }
    if out.iter().any(|(f, t, d)| f == from && t == to && *d == dep_type) {
        return;
    }
    out.push((from.to_string(), to.to_string(), dep_type));
}

fn text_of<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Walk back over immediately preceding comment siblings (doc comments
/// directly above the declaration, no blank line between).
fn leading_comment(node: Node, source: &str) -> Option<String> {
    let mut sibling = node.prev_sibling()?;
    let mut lines = Vec::new();
    loop {
        if !sibling.kind().contains("comment") {
            break;
        }
        lines.push(text_of(sibling, source).trim().to_string());
        match sibling.prev_sibling() {
            Some(s) => sibling = s,
            None => break,
        }
    }
    if lines.is_empty() {
        None
    } else {
        lines.reverse();
        Some(lines.join("\n"))
    }
}

pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_rust_function_with_doc_comment() {
        let source = "/// Adds two numbers.\npub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
        let extracted = extract("src/lib.rs", source, Language::Rust).unwrap();
        assert_eq!(extracted.entities.len(), 1);
        let entity = &extracted.entities[0];
        assert_eq!(entity.name, "add");
        assert_eq!(entity.kind, EntityKind::Function);
        assert!(entity.signature.starts_with("pub fn add"));
        assert_eq!(entity.doc_comment.as_deref(), Some("/// Adds two numbers."));
    }

    #[test]
    fn sig_hash_stable_under_body_edit() {
        let a = "fn foo(x: i32) -> i32 {\n    x + 1\n}\n";
        let b = "fn foo(x: i32) -> i32 {\n    x + 999\n}\n";
        let ea = &extract("a.rs", a, Language::Rust).unwrap().entities[0];
        let eb = &extract("a.rs", b, Language::Rust).unwrap().entities[0];
        assert_eq!(ea.sig_hash, eb.sig_hash);
        assert_ne!(ea.body_hash, eb.body_hash);
    }

    #[test]
    fn extracts_python_function_and_class() {
        let source = "def greet(name):\n    return name\n\nclass Greeter:\n    pass\n";
        let extracted = extract("a.py", source, Language::Python).unwrap();
        assert_eq!(extracted.entities.len(), 2);
        assert!(extracted.entities.iter().any(|e| e.name == "greet" && e.kind == EntityKind::Function));
        assert!(extracted.entities.iter().any(|e| e.name == "Greeter" && e.kind == EntityKind::Class));
    }

    #[test]
    fn extracts_go_function_declaration() {
        let source = "package main\n\nfunc Add(a int, b int) int {\n\treturn a + b\n}\n";
        let extracted = extract("a.go", source, Language::Go).unwrap();
        assert_eq!(extracted.entities.len(), 1);
        assert_eq!(extracted.entities[0].name, "Add");
    }

    #[test]
    fn extracts_java_method_inside_class() {
        let source = "class Calc {\n    int add(int a, int b) {\n        return a + b;\n    }\n}\n";
        let extracted = extract("Calc.java", source, Language::Java).unwrap();
        assert!(extracted.entities.iter().any(|e| e.name == "Calc" && e.kind == EntityKind::Class));
        assert!(extracted.entities.iter().any(|e| e.name == "add" && e.kind == EntityKind::Method));
    }

    #[test]
    fn rust_call_within_file_becomes_local_edge() {
        let source = "fn helper() -> i32 {\n    1\n}\n\nfn main() {\n    helper();\n}\n";
        let extracted = extract("a.rs", source, Language::Rust).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("main".to_string(), "helper".to_string(), cx_domain::DepType::Calls)));
    }

    #[test]
    fn rust_method_call_resolves_to_rightmost_identifier() {
        let source = "struct Counter;\n\nimpl Counter {\n    fn bump(&self) {}\n}\n\nfn tick(c: &Counter) {\n    c.bump();\n}\n";
        let extracted = extract("a.rs", source, Language::Rust).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("tick".to_string(), "bump".to_string(), cx_domain::DepType::Calls)));
    }

    #[test]
    fn rust_type_usage_becomes_uses_type_edge() {
        let source = "struct Widget;\n\nfn build() -> Widget {\n    Widget\n}\n";
        let extracted = extract("a.rs", source, Language::Rust).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("build".to_string(), "Widget".to_string(), cx_domain::DepType::UsesType)));
    }

    #[test]
    fn call_to_undeclared_name_emits_no_edge() {
        let source = "fn main() {\n    println!(\"hi\");\n    unresolved_helper();\n}\n";
        let extracted = extract("a.rs", source, Language::Rust).unwrap();
        assert!(extracted.local_edges.is_empty());
    }

    #[test]
    fn python_call_within_file_becomes_local_edge() {
        let source = "def helper():\n    return 1\n\ndef main():\n    helper()\n";
        let extracted = extract("a.py", source, Language::Python).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("main".to_string(), "helper".to_string(), cx_domain::DepType::Calls)));
    }

    #[test]
    fn go_call_within_file_becomes_local_edge() {
        let source = "package main\n\nfunc helper() int {\n\treturn 1\n}\n\nfunc main() {\n\thelper()\n}\n";
        let extracted = extract("a.go", source, Language::Go).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("main".to_string(), "helper".to_string(), cx_domain::DepType::Calls)));
    }

    #[test]
    fn java_method_invocation_becomes_local_edge() {
        let source = "class Calc {\n    int helper() { return 1; }\n    int run() { return helper(); }\n}\n";
        let extracted = extract("Calc.java", source, Language::Java).unwrap();
        assert!(extracted
            .local_edges
            .contains(&("run".to_string(), "helper".to_string(), cx_domain::DepType::Calls)));
    }
}
