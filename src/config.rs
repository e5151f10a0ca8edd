//! Configuration for marshalling and unmarshalling

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MetadataError, Result};

/// How unknown constructs are handled during unmarshalling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Unknown attributes, unknown elements and unroutable children are logged and skipped
    #[default]
    Lenient,
    /// The first unknown construct aborts the parse
    Strict,
}

/// Configuration shared by the object builder, the XML builder and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarshalConfig {
    /// Serialize using the legacy tag names (DataFile, Deployment, destiny, ...)
    pub legacy: bool,

    /// Unknown construct policy when parsing
    pub mode: ParseMode,

    /// Validate the document structure before building objects
    pub validate: bool,

    /// Indent serialized output
    pub pretty: bool,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            legacy: false,
            mode: ParseMode::Lenient,
            validate: false,
            pretty: true,
        }
    }
}

impl MarshalConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> MarshalConfigBuilder {
        MarshalConfigBuilder::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MetadataError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ParseMode::Strict
    }
}

/// Builder for MarshalConfig
#[derive(Debug, Default)]
pub struct MarshalConfigBuilder {
    config: MarshalConfig,
}

impl MarshalConfigBuilder {
    /// Use the legacy XML dialect when serializing
    pub fn legacy(mut self, legacy: bool) -> Self {
        self.config.legacy = legacy;
        self
    }

    /// Set the unknown construct policy
    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Shorthand for `mode(ParseMode::Strict)`
    pub fn strict(self) -> Self {
        self.mode(ParseMode::Strict)
    }

    /// Enable or disable structural validation before building
    pub fn validate(mut self, validate: bool) -> Self {
        self.config.validate = validate;
        self
    }

    /// Enable or disable indentation of serialized output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Build the configuration
    pub fn build(self) -> MarshalConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarshalConfig::default();
        assert!(!config.legacy);
        assert!(!config.validate);
        assert!(config.pretty);
        assert_eq!(config.mode, ParseMode::Lenient);
    }

    #[test]
    fn test_builder() {
        let config = MarshalConfig::builder()
            .legacy(true)
            .strict()
            .validate(true)
            .pretty(false)
            .build();
        assert!(config.legacy);
        assert!(config.is_strict());
        assert!(config.validate);
        assert!(!config.pretty);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = MarshalConfig::from_toml_str("legacy = true\nmode = \"strict\"\n").unwrap();
        assert!(config.legacy);
        assert!(config.is_strict());
        assert!(config.pretty);
    }

    #[test]
    fn test_from_toml_rejects_bad_mode() {
        let err = MarshalConfig::from_toml_str("mode = \"sloppy\"").unwrap_err();
        assert!(matches!(err, MetadataError::Config(_)));
    }
}
