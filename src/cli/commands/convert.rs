//! Convert command implementation

use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::commands::{load_config, load_input};
use crate::cli::error::CliError;
use crate::export::{ExportFormat, export_entities};
use crate::import::import_str;

/// Arguments for the convert command
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub input: String,
    pub legacy: bool,
    pub to: ExportFormat,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub validate: bool,
    pub config: Option<PathBuf>,
}

/// Handle the convert command
///
/// Reads a metadata document in either dialect and writes it back out as XML in
/// the requested dialect, or as JSON.
pub fn handle_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    config.legacy |= args.legacy;
    config.validate |= args.validate;
    if args.strict {
        config.mode = crate::config::ParseMode::Strict;
    }

    let content = load_input(&args.input)?;
    let imported = import_str(&content, &config)?;
    for problem in &imported.errors {
        warn!("Skipped: {}", problem);
    }
    info!(
        "Read {} top-level entities from {}",
        imported.document.len(),
        args.input
    );

    let entities = imported.document.into_entities();
    let exported = export_entities(&entities, args.to, &config)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &exported.content)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            info!("Wrote {} output to {}", exported.format, path.display());
        }
        None => println!("{}", exported.content),
    }
    Ok(())
}
