//! The Protoidl Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use crate::cli::args::{Command, OutputFormat, ProtoidlArgs};
use crate::config::{DuplicatePolicy, ParseOptions, TrailingComma};
use crate::errors::{print_error, IdlError};
use crate::syntax::{normalize, IdlParser};
use clap::Parser;
use std::path::Path;
use std::process;
use std::sync::Once;

pub mod args;
pub mod output;

static TRACING_INIT: Once = Once::new();

/// Install the fmt subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: u8) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let default = match verbose {
            0 => "warn",
            1 => "protoidl=debug",
            _ => "protoidl=trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}

/// The main entry point for the CLI.
pub fn run() {
    let args = ProtoidlArgs::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Parse {
            file,
            format,
            config,
            duplicates,
            trailing_comma,
        } => resolve_options(config.as_deref(), duplicates, trailing_comma)
            .and_then(|options| handle_parse(&file, format, options)),
        Command::Normalize { file } => handle_normalize(&file),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

/// Layers command-line overrides on top of the optional config file.
fn resolve_options(
    config: Option<&Path>,
    duplicates: Option<DuplicatePolicy>,
    trailing_comma: Option<TrailingComma>,
) -> Result<ParseOptions, IdlError> {
    let mut options = match config {
        Some(path) => ParseOptions::from_yaml_file(path)?,
        None => ParseOptions::default(),
    };
    if let Some(policy) = duplicates {
        options = options.with_duplicate_messages(policy);
    }
    if let Some(trailing_comma) = trailing_comma {
        options = options.with_trailing_comma(trailing_comma);
    }
    Ok(options)
}

/// Handles the `parse` subcommand.
fn handle_parse(path: &Path, format: OutputFormat, options: ParseOptions) -> Result<(), IdlError> {
    let file = IdlParser::with_options(options).parse_file(path)?;
    let written = match format {
        OutputFormat::Json => output::print_json(&file),
        OutputFormat::Summary => output::print_summary(&file),
    };
    written.map_err(|source| IdlError::Write {
        target: "stdout",
        source,
    })
}

/// Handles the `normalize` subcommand.
fn handle_normalize(path: &Path) -> Result<(), IdlError> {
    let source = std::fs::read_to_string(path).map_err(|source| IdlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    println!("{}", normalize(&source).as_str());
    Ok(())
}
