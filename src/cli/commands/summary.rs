//! Summary command implementation

use crate::cli::commands::load_input;
use crate::cli::error::CliError;
use crate::cli::output::format_summary;
use crate::config::MarshalConfig;
use crate::import::import_str;

/// Handle the summary command
pub fn handle_summary(input: &str) -> Result<(), CliError> {
    let content = load_input(input)?;
    let imported = import_str(&content, &MarshalConfig::default())?;
    print!("{}", format_summary(&imported));
    Ok(())
}
