//! Per-language node-type → semantic-kind tables, mapping each grammar's
//! parser node-types to semantic entity kinds.

use cx_domain::EntityKind;

use crate::ast::Language;

/// `(tree-sitter node kind, semantic EntityKind, has_own_body)`. `has_own_body`
/// controls whether we hash a body at all (imports/constants have none).
pub fn table_for(language: Language) -> &'static [(&'static str, EntityKind, bool)] {
    match language {
        Language::Rust => &[
            ("function_item", EntityKind::Function, true),
            ("struct_item", EntityKind::Struct, true),
            ("enum_item", EntityKind::Enum, true),
            ("trait_item", EntityKind::Trait, true),
            ("const_item", EntityKind::Constant, false),
            ("static_item", EntityKind::Constant, false),
            ("mod_item", EntityKind::Module, true),
            ("use_declaration", EntityKind::Import, false),
        ],
        Language::Python => &[
            ("function_definition", EntityKind::Function, true),
            ("class_definition", EntityKind::Class, true),
            ("import_statement", EntityKind::Import, false),
            ("import_from_statement", EntityKind::Import, false),
        ],
        Language::Go => &[
            ("function_declaration", EntityKind::Function, true),
            ("method_declaration", EntityKind::Method, true),
            ("type_spec", EntityKind::Type, true),
            ("import_spec", EntityKind::Import, false),
            ("const_spec", EntityKind::Constant, false),
            ("var_spec", EntityKind::Variable, false),
        ],
        Language::Java => &[
            ("method_declaration", EntityKind::Method, true),
            ("class_declaration", EntityKind::Class, true),
            ("interface_declaration", EntityKind::Interface, true),
            ("enum_declaration", EntityKind::Enum, true),
            ("import_declaration", EntityKind::Import, false),
            ("field_declaration", EntityKind::Variable, false),
        ],
        // Remaining languages are covered by extract::generic's regex-based
        // fallback, not a tree-sitter grammar in this workspace's dependency set.
        Language::TypeScript
        | Language::JavaScript
        | Language::CSharp
        | Language::C
        | Language::Cpp
        | Language::Php
        | Language::Kotlin
        | Language::Ruby => &[],
    }
}
