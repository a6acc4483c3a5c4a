//! Project configuration stored in `.glossa/config.json`.
//!
//! The file carries the relation type definitions alongside a handful of
//! engine settings. Every field has a default, so a partial (or missing)
//! file still yields a working setup with the built-in types.

use crate::error::ConfigError;
use crate::registry::{RelationTypeRegistry, DEFAULT_RELATION_TYPE};
use crate::relation_type::{builtin_types, RelationType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory holding Glossa state inside a project.
pub const CONFIG_DIR: &str = ".glossa";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlossaConfig {
    pub version: String,

    /// Sled database location, relative to the project root.
    pub store_path: PathBuf,

    /// Upper bound on any single storage call.
    pub operation_timeout_ms: u64,

    /// Cap on nodes returned by one graph traversal.
    pub max_graph_nodes: usize,

    /// Namespace for exported IRIs. Should end with `/`.
    pub base_uri: String,

    pub default_relation_type: String,

    pub relation_types: Vec<RelationType>,
}

impl Default for GlossaConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            store_path: PathBuf::from(CONFIG_DIR).join("store"),
            operation_timeout_ms: 5_000,
            max_graph_nodes: 500,
            base_uri: "https://open-metadata.org/".to_string(),
            default_relation_type: DEFAULT_RELATION_TYPE.to_string(),
            relation_types: builtin_types(),
        }
    }
}

impl GlossaConfig {
    /// Path of the config file for a project rooted at `root`.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the project config, or the defaults if there is none.
    pub fn load_or_default(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(root);
        if path.exists() {
            Self::load(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validates the configured relation types into a registry.
    pub fn registry(&self) -> Result<RelationTypeRegistry, ConfigError> {
        Ok(RelationTypeRegistry::new(
            self.relation_types.clone(),
            self.default_relation_type.clone(),
        )?)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Resolves the store path against the project root.
    pub fn store_path_in(&self, root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            root.join(&self.store_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = GlossaConfig::load_or_default(dir.path()).unwrap();

        assert_eq!(config, GlossaConfig::default());
        assert_eq!(config.registry().unwrap().len(), 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = GlossaConfig::path_in(dir.path());

        let mut config = GlossaConfig::default();
        config.max_graph_nodes = 42;
        config.save(&path).unwrap();

        let loaded = GlossaConfig::load(&path).unwrap();
        assert_eq!(loaded.max_graph_nodes, 42);
        assert_eq!(loaded.relation_types.len(), 10);
    }

    #[test]
    fn test_partial_config() {
        let dir = tempdir().unwrap();
        let path = GlossaConfig::path_in(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "operationTimeoutMs": 250, "defaultRelationType": "seeAlso" }"#).unwrap();

        let config = GlossaConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.operation_timeout(), Duration::from_millis(250));
        assert_eq!(config.registry().unwrap().default_type().name, "seeAlso");
    }

    #[test]
    fn test_invalid_types_fail_registry() {
        let config = GlossaConfig {
            relation_types: vec![RelationType::new("bad name", "Bad", "#000000")],
            default_relation_type: "bad name".into(),
            ..GlossaConfig::default()
        };

        assert!(matches!(config.registry(), Err(ConfigError::Registry(_))));
    }
}
