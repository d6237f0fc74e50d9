//! Protoidl Parser - single-use front door to the grammar.
//!
//! An `IdlParser` parses exactly one input. Each call normalizes the source,
//! builds a fresh `Grammar` over it and keeps the outcome; a second call is
//! rejected with `AlreadyConsumed` and leaves the first outcome untouched.

use std::path::Path;

use tracing::debug;

use super::grammar::{Grammar, ParseOutcome};
use super::normalize::{normalize, Buffer};
use crate::config::ParseOptions;
use crate::errors::{ErrorKind, IdlError, PResult, ParseError, SourceContext};
use crate::ir::{FileDescriptor, MessageRegistry};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse IDL source with default options.
pub fn parse(source: &str) -> PResult<FileDescriptor> {
    IdlParser::new().parse(source)
}

/// Read and parse one IDL file with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<FileDescriptor, IdlError> {
    IdlParser::new().parse_file(path)
}

#[derive(Debug, Default)]
pub struct IdlParser {
    options: ParseOptions,
    consumed: bool,
    outcome: Option<ParseOutcome>,
}

impl IdlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Whether this parser has already been used.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Parse `source`, returning the methods it declares in order.
    pub fn parse(&mut self, source: &str) -> PResult<FileDescriptor> {
        self.consume()?;
        self.run(normalize(source))
    }

    /// Parse `source`, attaching the normalized buffer to any error under `name`.
    pub fn parse_named(&mut self, name: &str, source: &str) -> Result<FileDescriptor, IdlError> {
        let buffer = normalize(source);
        self.consume()
            .and_then(|()| self.run(buffer.clone()))
            .map_err(|error| {
                IdlError::Parse(error.with_source(SourceContext::new(name, buffer.as_str())))
            })
    }

    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<FileDescriptor, IdlError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| IdlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_named(&path.display().to_string(), &source)
    }

    /// Methods from the successful parse, if there was one.
    pub fn file_descriptor(&self) -> Option<&FileDescriptor> {
        self.outcome.as_ref().map(|outcome| &outcome.file)
    }

    /// Messages registered by the successful parse, if there was one.
    pub fn registry(&self) -> Option<&MessageRegistry> {
        self.outcome.as_ref().map(|outcome| &outcome.registry)
    }

    /// Take the full outcome out of the parser.
    pub fn into_outcome(self) -> Option<ParseOutcome> {
        self.outcome
    }

    fn consume(&mut self) -> PResult<()> {
        if self.consumed {
            return Err(ParseError::new(0, ErrorKind::AlreadyConsumed));
        }
        self.consumed = true;
        Ok(())
    }

    fn run(&mut self, buffer: Buffer) -> PResult<FileDescriptor> {
        debug!(chars = buffer.len(), "normalized source");
        let outcome = Grammar::new(buffer, self.options).run()?;
        let file = outcome.file.clone();
        self.outcome = Some(outcome);
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let mut parser = IdlParser::new();
        assert!(parser.parse("").unwrap().is_empty());
        assert!(parser.registry().unwrap().is_empty());
    }

    #[test]
    fn test_comment_only_input() {
        assert!(parse("# nothing here\n# at all\n").unwrap().is_empty());
    }

    #[test]
    fn test_reuse_rejected() {
        let mut parser = IdlParser::new();
        parser.parse("message M {}").unwrap();
        let err = parser.parse("message N {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyConsumed);
        assert!(parser.registry().unwrap().contains("M"));
        assert!(!parser.registry().unwrap().contains("N"));
    }

    #[test]
    fn test_failed_parse_still_consumes() {
        let mut parser = IdlParser::new();
        assert!(parser.parse("message {").is_err());
        assert!(parser.is_consumed());
        assert!(parser.file_descriptor().is_none());
        assert_eq!(parser.parse("").unwrap_err().kind, ErrorKind::AlreadyConsumed);
    }

    #[test]
    fn test_parse_named_attaches_source() {
        let err = IdlParser::new()
            .parse_named("api.idl", "method  X(A) -> B;")
            .unwrap_err();
        let parse_error = err.parse_error().unwrap();
        assert!(matches!(parse_error.kind, ErrorKind::UndefinedMessage { .. }));
        assert_eq!(parse_error.position, 9);
    }
}
