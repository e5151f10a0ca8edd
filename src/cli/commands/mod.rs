//! CLI command implementations

pub mod convert;
pub mod summary;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::config::MarshalConfig;

/// Load input content from file or stdin
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Start from the config file when one is given, otherwise from defaults
pub fn load_config(path: Option<&Path>) -> Result<MarshalConfig, CliError> {
    match path {
        Some(path) => MarshalConfig::from_toml_file(path)
            .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string())),
        None => Ok(MarshalConfig::default()),
    }
}
