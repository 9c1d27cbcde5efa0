//! Layered configuration for the metrics/drift/diagram engines:
//! defaults, then an optional YAML file, then programmatic overrides.

pub mod provenance;

use serde::{Deserialize, Serialize};

use crate::errors::{IrError, Result};
pub use provenance::{ConfigProvenance, ConfigSource};

/// PageRank tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self { damping: 0.85, max_iterations: 100, tolerance: 1e-6 }
    }
}

/// Betweenness exact-vs-approximate threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetweennessConfig {
    /// Below this node count, compute exact Brandes betweenness.
    pub exact_node_threshold: usize,
    /// Above the threshold, sample this many pivot sources.
    pub approx_sample_size: usize,
}

impl Default for BetweennessConfig {
    fn default() -> Self {
        Self { exact_node_threshold: 10_000, approx_sample_size: 200 }
    }
}

/// Search ranking: `combined_score = α·fts + (1−α)·pagerank`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    pub fts_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { fts_weight: 0.6 }
    }
}

/// Diagram preset defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagramDefaults {
    pub architecture_max_nodes: usize,
    pub call_flow_max_nodes: usize,
    pub coverage_max_nodes: usize,
    pub dependency_max_nodes: usize,
    pub call_flow_default_depth: usize,
    pub call_flow_max_depth: usize,
}

impl Default for DiagramDefaults {
    fn default() -> Self {
        Self {
            architecture_max_nodes: 50,
            call_flow_max_nodes: 30,
            coverage_max_nodes: 40,
            dependency_max_nodes: 30,
            call_flow_default_depth: 3,
            call_flow_max_depth: 10,
        }
    }
}

/// Drift broken-dependency caller cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriftConfig {
    pub max_callers_per_drift: usize,
    pub broken_dependency_cap: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { max_callers_per_drift: 5, broken_dependency_cap: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CxConfig {
    #[serde(default)]
    pub pagerank: PageRankConfig,
    #[serde(default)]
    pub betweenness: BetweennessConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub diagram: DiagramDefaults,
    #[serde(default)]
    pub drift: DriftConfig,
}

impl CxConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| IrError::new(cx_domain::ErrorKind::Input, format!("invalid config yaml: {e}")))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| IrError::internal(format!("config serialization failed: {e}")))
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<(Self, ConfigProvenance)> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| IrError::new(cx_domain::ErrorKind::Input, format!("cannot read config file: {e}")))?;
        let config = Self::from_yaml_str(&raw)?;
        let provenance = ConfigProvenance::from_file(path.display().to_string());
        Ok((config, provenance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = CxConfig::default();
        assert_eq!(config.pagerank.damping, 0.85);
        assert_eq!(config.pagerank.max_iterations, 100);
        assert_eq!(config.pagerank.tolerance, 1e-6);
        assert_eq!(config.search.fts_weight, 0.6);
    }

    #[test]
    fn yaml_round_trip_is_identity() {
        let config = CxConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        let reloaded = CxConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "pagerank:\n  damping: 0.9\n  max_iterations: 50\n  tolerance: 0.00001\n";
        let config = CxConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.pagerank.damping, 0.9);
        assert_eq!(config.search.fts_weight, 0.6); // still default
    }
}
