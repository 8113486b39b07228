//! `siftql.toml` configuration.
//!
//! ```toml
//! id_attribute = "id"
//! include_cursor = false
//! allow_filtering = true
//! malformed_cursor = "reject"
//! array_strategy = "delimited_string"
//!
//! [attributes]
//! name = "String"
//! tags = "[String]"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ast::AttributeTypeMap;
use crate::cursor::Fallback;
use crate::error::{SiftError, SiftResult};
use crate::transpiler::ArrayStrategy;

pub const CONFIG_FILE: &str = "siftql.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub id_attribute: String,
    pub include_cursor: bool,
    pub allow_filtering: bool,
    pub malformed_cursor: Fallback,
    pub array_strategy: ArrayStrategy,
    pub attributes: AttributeTypeMap,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            id_attribute: "id".to_string(),
            include_cursor: false,
            allow_filtering: false,
            malformed_cursor: Fallback::default(),
            array_strategy: ArrayStrategy::default(),
            attributes: AttributeTypeMap::new(),
        }
    }
}

impl SiftConfig {
    /// Load `./siftql.toml`, then `<config dir>/siftql/siftql.toml`,
    /// falling back to defaults when neither exists.
    pub fn load() -> SiftResult<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> SiftResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> SiftResult<Self> {
        let config: SiftConfig =
            toml::from_str(content).map_err(|e| SiftError::Config(e.to_string()))?;
        if config.id_attribute.trim().is_empty() {
            return Err(SiftError::Config("id_attribute must not be empty".into()));
        }
        config
            .attributes
            .validate()
            .map_err(|e| SiftError::Config(e.to_string()))?;
        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("siftql").join(CONFIG_FILE));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(SiftConfig::from_toml("").unwrap(), SiftConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = SiftConfig::from_toml(
            r#"
            id_attribute = "uuid"
            include_cursor = true
            allow_filtering = true
            malformed_cursor = "reject"
            array_strategy = "native"

            [attributes]
            name = "String"
            tags = "[String]"
            "#,
        )
        .unwrap();
        assert_eq!(config.id_attribute, "uuid");
        assert!(config.include_cursor);
        assert!(config.allow_filtering);
        assert_eq!(config.malformed_cursor, Fallback::Reject);
        assert_eq!(config.array_strategy, ArrayStrategy::Native);
        assert!(config.attributes.is_array("tags"));
        assert_eq!(config.attributes.declaration("name"), Some("String"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SiftConfig::from_toml(r#"malformed_cursor = "sometimes""#),
            Err(SiftError::Config(_))
        ));
        assert!(matches!(
            SiftConfig::from_toml(r#"id_attribute = """#),
            Err(SiftError::Config(_))
        ));
    }
}
