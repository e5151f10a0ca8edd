//! SSDS Metadata - XML marshalling for Shore-Side Data System metadata
//!
//! Provides:
//! - The metadata entity model (DataProducers, DataContainers, Devices, ...)
//! - ObjectBuilder: XML (current or legacy dialect) to entity graphs
//! - XmlBuilder: entity graphs to XML
//! - Structural and value validation
//! - A persistence abstraction keyed on business keys

pub mod coercion;
pub mod config;
pub mod dao;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod validation;
pub mod xml;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{MarshalConfig, MarshalConfigBuilder, ParseMode};
pub use dao::{DaoError, InMemoryDao, MetadataDao};
pub use document::{ParsedDocument, parse_document, serialize_document};
pub use error::{MetadataError, Result, ValidityError};
pub use export::{ExportFormat, ExportResult, XmlBuilder};
pub use import::{ImportResult, ObjectBuilder};

// Re-export models
pub use models::*;
