//! Parser options.
//!
//! Options can be built in code, read from a YAML file, or set from the
//! command line. The defaults reproduce the historical grammar: duplicate
//! message names overwrite earlier ones and a trailing comma in a message body
//! is accepted.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::IdlError;

/// What to do when a message name is declared twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The later declaration replaces the earlier one.
    #[default]
    Overwrite,
    /// A second declaration fails with `DuplicateMessage`.
    Reject,
}

/// Whether `{ a: int32, }` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrailingComma {
    /// A comma not followed by a field ends the body.
    #[default]
    Allow,
    /// Every comma must be followed by a field.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ParseOptions {
    pub duplicate_messages: DuplicatePolicy,
    pub trailing_comma: TrailingComma,
}

impl ParseOptions {
    /// Options with every leniency turned off.
    pub fn strict() -> Self {
        Self {
            duplicate_messages: DuplicatePolicy::Reject,
            trailing_comma: TrailingComma::Reject,
        }
    }

    pub fn with_duplicate_messages(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_messages = policy;
        self
    }

    pub fn with_trailing_comma(mut self, trailing_comma: TrailingComma) -> Self {
        self.trailing_comma = trailing_comma;
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document means "all defaults"
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, IdlError> {
        let text = std::fs::read_to_string(path).map_err(|source| IdlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| IdlError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
