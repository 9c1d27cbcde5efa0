//! `DiagramConfig` and its four named presets (architecture / call_flow /
//! coverage / dependency), whose numeric defaults come from
//! `CxConfig::diagram` rather than being hardcoded twice.

use serde::{Deserialize, Serialize};

use crate::config::CxConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    Architecture,
    CallFlow,
    Coverage,
    Dependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramDirection {
    TopDown,
    BottomUp,
    LeftRight,
}

impl DiagramDirection {
    pub fn mermaid_token(&self) -> &'static str {
        match self {
            DiagramDirection::TopDown => "TD",
            DiagramDirection::BottomUp => "BT",
            DiagramDirection::LeftRight => "LR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramConfig {
    pub diagram_type: DiagramType,
    pub direction: DiagramDirection,
    pub max_nodes: usize,
    /// Collapse sibling leaves into a container summary node (architecture only).
    pub collapse: bool,
    pub show_labels: bool,
    pub show_icons: bool,
    pub theme: Option<String>,
    pub title: Option<String>,
}

impl DiagramConfig {
    /// Preset defaults for each diagram type, sourced from `CxConfig::diagram`.
    pub fn preset(diagram_type: DiagramType, config: &CxConfig) -> Self {
        let d = &config.diagram;
        match diagram_type {
            DiagramType::Architecture => Self {
                diagram_type,
                direction: DiagramDirection::TopDown,
                max_nodes: d.architecture_max_nodes,
                collapse: true,
                show_labels: true,
                show_icons: true,
                theme: None,
                title: Some("Architecture".to_string()),
            },
            DiagramType::CallFlow => Self {
                diagram_type,
                direction: DiagramDirection::TopDown,
                max_nodes: d.call_flow_max_nodes,
                collapse: false,
                show_labels: true,
                show_icons: false,
                theme: None,
                title: Some("Call Flow".to_string()),
            },
            DiagramType::Coverage => Self {
                diagram_type,
                direction: DiagramDirection::TopDown,
                max_nodes: d.coverage_max_nodes,
                collapse: false,
                show_labels: true,
                show_icons: true,
                theme: None,
                title: Some("Coverage".to_string()),
            },
            DiagramType::Dependency => Self {
                diagram_type,
                direction: DiagramDirection::LeftRight,
                max_nodes: d.dependency_max_nodes,
                collapse: false,
                show_labels: true,
                show_icons: false,
                theme: None,
                title: Some("Dependencies".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_spec_defaults() {
        let config = CxConfig::default();
        assert_eq!(DiagramConfig::preset(DiagramType::Architecture, &config).max_nodes, 50);
        assert_eq!(DiagramConfig::preset(DiagramType::CallFlow, &config).max_nodes, 30);
        assert_eq!(DiagramConfig::preset(DiagramType::Coverage, &config).max_nodes, 40);
        assert_eq!(DiagramConfig::preset(DiagramType::Dependency, &config).max_nodes, 30);
        assert!(!DiagramConfig::preset(DiagramType::CallFlow, &config).show_icons);
        assert!(DiagramConfig::preset(DiagramType::Architecture, &config).collapse);
    }
}
