//! Validate command implementation

use crate::cli::commands::load_input;
use crate::cli::error::CliError;
use crate::validation::{schema, validate_entity};
use crate::xml;

/// Handle the validate command
///
/// Runs the structural checks on the document, then the value checks on every
/// entity it contains. All problems are printed before failing.
pub fn handle_validate(input: &str) -> Result<(), CliError> {
    let content = load_input(input)?;
    let root = xml::parse_str(&content)?;

    let problems = schema::validate_tree(&root);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  {}", problem);
        }
        return Err(CliError::ValidationError(format!(
            "{} structural problem(s)",
            problems.len()
        )));
    }

    let document = crate::document::parse_document(&content, &Default::default())?;
    let findings: Vec<_> = document
        .list_all()
        .into_iter()
        .flat_map(validate_entity)
        .collect();
    if !findings.is_empty() {
        for finding in &findings {
            eprintln!("  {}", finding);
        }
        return Err(CliError::ValidationError(format!(
            "{} value problem(s)",
            findings.len()
        )));
    }

    println!("Validation successful");
    Ok(())
}
