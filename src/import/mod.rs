//! Import functionality
//!
//! Turns metadata XML (current or legacy dialect) into entity graphs.

pub mod object_builder;

use crate::config::MarshalConfig;
use crate::document::ParsedDocument;
use crate::error::Result;

/// Result of an import operation
#[derive(Debug)]
pub struct ImportResult {
    /// Entities found at the top level of the document
    pub document: ParsedDocument,
    /// Problems that were skipped rather than aborting the import
    pub errors: Vec<String>,
}

/// Unmarshal `xml_text` and keep the skipped problems alongside the entities
pub fn import_str(xml_text: &str, config: &MarshalConfig) -> Result<ImportResult> {
    let mut builder = ObjectBuilder::new(config.clone());
    let document = builder.unmarshal(xml_text)?;
    Ok(ImportResult {
        document,
        errors: std::mem::take(&mut builder.errors),
    })
}

// Re-export for convenience
pub use object_builder::ObjectBuilder;
