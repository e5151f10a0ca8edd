//! CLI error types

use std::path::PathBuf;
use thiserror::Error;

use crate::error::MetadataError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Conversion failed: {0}")]
    ConversionError(#[from] MetadataError),
}
