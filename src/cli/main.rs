//! ssds-metadata: convert, validate and summarize SSDS metadata documents
//!
//! ```bash
//! # Rewrite a legacy document in the current dialect
//! ssds-metadata convert deployment.xml --output deployment-current.xml
//!
//! # Current to legacy, reading stdin
//! cat deployment.xml | ssds-metadata convert - --legacy
//!
//! # Entity graph as JSON
//! ssds-metadata convert deployment.xml --to json
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ssds_metadata::cli::CliError;
use ssds_metadata::cli::commands::{convert, summary, validate};
use ssds_metadata::export::ExportFormat;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Xml,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xml => ExportFormat::Xml,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ssds-metadata")]
#[command(about = "SSDS metadata XML tools", long_about = None)]
struct Args {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a document and write it back out
    Convert {
        /// Input file, or "-" for stdin
        input: String,
        /// Write the legacy dialect (DataFile/Deployment/destiny ...)
        #[arg(long)]
        legacy: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Xml)]
        to: Format,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on unknown elements and bad version values
        #[arg(long)]
        strict: bool,
        /// Validate the document structure before building
        #[arg(long)]
        validate: bool,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check document structure and entity values
    Validate {
        /// Input file, or "-" for stdin
        input: String,
    },
    /// Count the entities in a document
    Summary {
        /// Input file, or "-" for stdin
        input: String,
    },
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Convert {
            input,
            legacy,
            to,
            output,
            strict,
            validate,
            config,
        } => convert::handle_convert(&convert::ConvertArgs {
            input,
            legacy,
            to: to.into(),
            output,
            strict,
            validate,
            config,
        }),
        Commands::Validate { input } => validate::handle_validate(&input),
        Commands::Summary { input } => summary::handle_summary(&input),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let name = match &args.command {
        Commands::Convert { .. } => "convert",
        Commands::Validate { .. } => "validate",
        Commands::Summary { .. } => "summary",
    };
    run(args.command).with_context(|| format!("{} failed", name))
}
