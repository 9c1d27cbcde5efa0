//! Field-level config provenance: tracks whether each config value came
//! from a default, a loaded file, or an explicit override.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConfigSource {
    Default,
    File { path: String },
    Override,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Default => "default".to_string(),
            ConfigSource::File { path } => format!("file:{path}"),
            ConfigSource::Override => "override".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigProvenance {
    field_sources: HashMap<String, ConfigSource>,
}

impl ConfigProvenance {
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl Into<String>) -> Self {
        let mut provenance = Self::default();
        provenance.field_sources.insert("*".to_string(), ConfigSource::File { path: path.into() });
        provenance
    }

    pub fn track_field(&mut self, field_path: &str, source: ConfigSource) {
        self.field_sources.insert(field_path.to_string(), source);
    }

    pub fn get_source(&self, field_path: &str) -> Option<&ConfigSource> {
        self.field_sources.get(field_path)
    }

    pub fn field_sources(&self) -> &HashMap<String, ConfigSource> {
        &self.field_sources
    }

    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        let mut sorted: Vec<_> = self.field_sources.iter().collect();
        sorted.sort_by_key(|(k, _)| (*k).clone());
        for (field, source) in sorted {
            lines.push(format!("{field} <- {}", source.describe()));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_field_level_overrides() {
        let mut prov = ConfigProvenance::defaults();
        prov.track_field("pagerank.damping", ConfigSource::Override);
        assert!(matches!(prov.get_source("pagerank.damping"), Some(ConfigSource::Override)));
        assert!(prov.get_source("search.fts_weight").is_none());
    }

    #[test]
    fn from_file_records_wildcard_source() {
        let prov = ConfigProvenance::from_file("cx.yaml");
        assert!(matches!(prov.get_source("*"), Some(ConfigSource::File { .. })));
    }
}
