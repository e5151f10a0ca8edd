//! Export functionality
//!
//! Provides serializers for entity graphs:
//! - SSDS metadata XML (current or legacy dialect)
//! - JSON

pub mod xml_builder;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MarshalConfig;
use crate::error::{MetadataError, Result};
use crate::models::Entity;

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xml,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Xml => write!(f, "xml"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: ExportFormat,
}

/// Serialize `entities` in the requested format
pub fn export_entities(
    entities: &[Entity],
    format: ExportFormat,
    config: &MarshalConfig,
) -> Result<ExportResult> {
    let content = match format {
        ExportFormat::Xml => {
            let mut builder = XmlBuilder::new(config.clone());
            builder.extend(entities.iter().cloned());
            builder.to_xml_string()?
        }
        ExportFormat::Json => {
            let json = if config.pretty {
                serde_json::to_string_pretty(entities)
            } else {
                serde_json::to_string(entities)
            };
            json.map_err(|e| MetadataError::Encoding {
                field: "document".to_string(),
                message: e.to_string(),
            })?
        }
    };
    Ok(ExportResult { content, format })
}

// Re-export for convenience
pub use xml_builder::XmlBuilder;
