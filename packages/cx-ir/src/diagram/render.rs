//! Deterministic Mermaid flowchart rendering. Node/edge ordering is never
//! recomputed here — it trusts the id-sorted entities and `(from, to)`-
//! sorted edges the assembler already produced.

use std::collections::BTreeMap;

use super::{Diagram, DiagramConfig};

fn icon_for(kind: &str) -> &'static str {
    match kind {
        "function" | "method" => "\u{0192}",
        "class" | "struct" | "record" => "\u{25ad}",
        "interface" | "trait" => "\u{25c7}",
        "enum" => "\u{25c9}",
        _ => "\u{25cf}",
    }
}

fn node_label(entity: &super::DiagramEntity, config: &DiagramConfig) -> String {
    if !config.show_labels {
        return entity.id.clone();
    }
    let prefix = if config.show_icons { format!("{} ", icon_for(&entity.kind)) } else { String::new() };
    format!("{}[\"{prefix}{}\"]", entity.id, entity.label)
}

pub fn render_mermaid(diagram: &Diagram, config: &DiagramConfig) -> String {
    let mut out = String::new();
    if let Some(title) = &config.title {
        out.push_str(&format!("%% {title}\n"));
    }
    out.push_str(&format!("flowchart {}\n", config.direction.mermaid_token()));

    let mut containers: BTreeMap<String, Vec<&super::DiagramEntity>> = BTreeMap::new();
    for entity in &diagram.entities {
        containers.entry(entity.container.clone().unwrap_or_default()).or_default().push(entity);
    }

    if let Some(top_level) = containers.remove("") {
        for entity in top_level {
            out.push_str(&format!("    {}\n", node_label(entity, config)));
        }
    }
    for (container, entities) in &containers {
        out.push_str(&format!("    subgraph {container}\n"));
        for entity in entities {
            out.push_str(&format!("        {}\n", node_label(entity, config)));
        }
        out.push_str("    end\n");
    }

    for edge in &diagram.edges {
        if config.show_labels {
            out.push_str(&format!("    {} -->|{}| {}\n", edge.from, edge.dep_type, edge.to));
        } else {
            out.push_str(&format!("    {} --> {}\n", edge.from, edge.to));
        }
    }

    for entity in &diagram.entities {
        if let Some(color) = &entity.color {
            out.push_str(&format!("    style {} fill:{color}\n", entity.id));
        }
        if entity.is_root {
            out.push_str(&format!("    style {} stroke-width:4px\n", entity.id));
        }
    }

    if diagram.diagram_type == super::DiagramType::Coverage {
        out.push_str("    %% legend: lower coverage sorts first\n");
    }

    if diagram.truncated_count > 0 {
        out.push_str(&format!("    %% {} node(s) truncated to honor max_nodes\n", diagram.truncated_count));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramDirection, DiagramEdge, DiagramEntity, DiagramType};

    fn sample() -> Diagram {
        Diagram {
            title: "t".into(),
            diagram_type: DiagramType::Dependency,
            entities: vec![
                DiagramEntity {
                    id: "a".into(),
                    label: "A".into(),
                    kind: "function".into(),
                    file_path: "a.go".into(),
                    container: None,
                    importance: None,
                    coverage_percent: None,
                    is_root: false,
                    color: None,
                },
                DiagramEntity {
                    id: "b".into(),
                    label: "B".into(),
                    kind: "function".into(),
                    file_path: "a.go".into(),
                    container: None,
                    importance: None,
                    coverage_percent: None,
                    is_root: false,
                    color: None,
                },
            ],
            edges: vec![DiagramEdge { from: "a".into(), to: "b".into(), dep_type: "calls".into() }],
            truncated_count: 0,
        }
    }

    #[test]
    fn renders_flowchart_header_nodes_and_edges() {
        let diagram = sample();
        let config = DiagramConfig {
            diagram_type: DiagramType::Dependency,
            direction: DiagramDirection::LeftRight,
            max_nodes: 30,
            collapse: false,
            show_labels: true,
            show_icons: false,
            theme: None,
            title: Some("t".into()),
        };
        let out = render_mermaid(&diagram, &config);
        assert!(out.starts_with("%% t\n"));
        assert!(out.contains("flowchart LR"));
        assert!(out.contains("a -->|calls| b"));
    }

    #[test]
    fn truncation_is_noted_not_silent() {
        let mut diagram = sample();
        diagram.truncated_count = 3;
        let config = DiagramConfig::preset(DiagramType::Dependency, &crate::config::CxConfig::default());
        let out = render_mermaid(&diagram, &config);
        assert!(out.contains("3 node(s) truncated"));
    }
}
