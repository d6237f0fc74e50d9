//! Defines the command-line arguments and subcommands for the Protoidl CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{DuplicatePolicy, TrailingComma};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "protoidl",
    version,
    about = "Parse RPC interface definitions into a method IR."
)]
pub struct ProtoidlArgs {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse an IDL file and print its method IR.
    Parse {
        /// The path to the IDL file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// How to print the result.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// YAML file with parser options.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override how redeclared message names are handled.
        #[arg(long, value_enum)]
        duplicates: Option<DuplicatePolicy>,
        /// Override whether a trailing comma is accepted in message bodies.
        #[arg(long, value_enum)]
        trailing_comma: Option<TrailingComma>,
    },
    /// Print the normalized buffer that error positions refer to.
    Normalize {
        /// The path to the IDL file to normalize.
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON in the IR's nested map shape.
    Json,
    /// A colored, human-readable listing.
    Summary,
}
