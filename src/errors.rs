//! Protoidl Error Handling
//!
//! Every rule in the parsing engine returns `PResult<T>`. A failure carries the
//! char index in the normalized buffer where it happened and an `ErrorKind`.
//! Kinds are split into recoverable ones, which ordered choice may backtrack
//! over, and fatal ones, which abort the parse from wherever they are raised.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type returned by every primitive and production.
pub type PResult<T> = Result<T, ParseError>;

// ============================================================================
// ERROR KINDS
// ============================================================================

/// Which side of a method signature referenced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    Request,
    Response,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Request => write!(f, "request"),
            MessageRole::Response => write!(f, "response"),
        }
    }
}

/// All failure kinds produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("expected {expected} but reached end of input")]
    EndOfInput { expected: String },

    #[error("expected a character in [{expected}], found '{found}'")]
    CharMismatch { expected: String, found: char },

    #[error("expected one of {}", quoted(.expected))]
    KeywordMismatch { expected: Vec<String> },

    #[error("expected {} but found {}", .rules.join(" or "), found_text(.found))]
    AmbiguousFailure {
        rules: Vec<&'static str>,
        found: Option<char>,
    },

    #[error("invalid character range '{low}-{high}' in class \"{spec}\": lower bound must precede upper bound")]
    InvalidRange { spec: String, low: char, high: char },

    #[error("{role} message '{name}' is not defined")]
    UndefinedMessage { role: MessageRole, name: String },

    #[error("message '{name}' is already defined")]
    DuplicateMessage { name: String },

    #[error("expected a field after ',' but found {}", found_text(.found))]
    DanglingComma { found: Option<char> },

    #[error("parser instance has already been consumed")]
    AlreadyConsumed,

    #[error("internal parser error: {message}")]
    Internal { message: String },
}

fn quoted(expected: &[String]) -> String {
    expected
        .iter()
        .map(|keyword| format!("'{}'", keyword))
        .collect::<Vec<_>>()
        .join(", ")
}

fn found_text(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{}'", c),
        None => "end of input".into(),
    }
}

impl ErrorKind {
    /// Fatal kinds are committed: ordered choice does not try further
    /// alternatives after one of them and the `try_*` variants pass them through.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::UndefinedMessage { .. }
                | Self::DuplicateMessage { .. }
                | Self::DanglingComma { .. }
                | Self::AlreadyConsumed
                | Self::Internal { .. }
        )
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::EndOfInput { .. } => "end_of_input",
            Self::CharMismatch { .. } => "char_mismatch",
            Self::KeywordMismatch { .. } => "keyword_mismatch",
            Self::AmbiguousFailure { .. } => "ambiguous_failure",
            Self::InvalidRange { .. } => "invalid_range",
            Self::UndefinedMessage { .. } => "undefined_message",
            Self::DuplicateMessage { .. } => "duplicate_message",
            Self::DanglingComma { .. } => "dangling_comma",
            Self::AlreadyConsumed => "already_consumed",
            Self::Internal { .. } => "internal",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::EndOfInput { .. } => "input ends here",
            Self::CharMismatch { .. } => "unexpected character",
            Self::KeywordMismatch { .. } => "unexpected token",
            Self::AmbiguousFailure { .. } => "no alternative could continue here",
            Self::InvalidRange { .. } => "while matching here",
            Self::UndefinedMessage { .. } => "undefined message",
            Self::DuplicateMessage { .. } => "redeclared here",
            Self::DanglingComma { .. } => "field expected here",
            Self::AlreadyConsumed => "parser reused",
            Self::Internal { .. } => "parser stopped here",
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            Self::UndefinedMessage { name, .. } => Some(format!(
                "declare `message {} {{ ... }}` before the method that uses it",
                name
            )),
            Self::DuplicateMessage { name } => Some(format!(
                "rename one of the '{}' declarations or allow overwriting duplicates",
                name
            )),
            Self::DanglingComma { .. } => {
                Some("remove the trailing ',' or allow trailing commas".into())
            }
            Self::AlreadyConsumed => Some("create a new parser for every input".into()),
            Self::Internal { .. } => {
                Some("This is an internal parser error. Please report this as a bug.".into())
            }
            _ => None,
        }
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// A failure at a char index of the normalized buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    pub fn new(position: usize, kind: ErrorKind) -> Self {
        Self { position, kind }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Attach the buffer the position refers to, for rendering.
    pub fn with_source(self, source: SourceContext) -> ParseDiagnostic {
        ParseDiagnostic::new(self, source)
    }
}

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named text that error positions point into.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Byte span of the char at `position`, clamped to the end of the text.
    pub fn span_at(&self, position: usize) -> SourceSpan {
        let mut chars = self.content.char_indices().skip(position);
        match chars.next() {
            Some((offset, c)) => SourceSpan::from(offset..offset + c.len_utf8()),
            None => SourceSpan::from(self.content.len()..self.content.len()),
        }
    }
}

/// A parse error bundled with the normalized buffer it indexes into.
#[derive(Debug)]
pub struct ParseDiagnostic {
    pub error: ParseError,
    source: Arc<NamedSource<String>>,
    span: SourceSpan,
    code: String,
}

impl ParseDiagnostic {
    pub fn new(error: ParseError, source: SourceContext) -> Self {
        let span = source.span_at(error.position);
        let code = format!("protoidl::parse::{}", error.kind.code_suffix());
        Self {
            error,
            source: source.to_named_source(),
            span,
            code,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error.kind
    }
}

impl std::error::Error for ParseDiagnostic {}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.error)
    }
}

impl Diagnostic for ParseDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.error
            .kind
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.error.kind.primary_label().to_string()),
            self.span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source)
    }
}

// ============================================================================
// CRATE ERROR
// ============================================================================

/// Errors from whole-file operations: reading input, loading options, parsing.
#[derive(Debug, Error, Diagnostic)]
pub enum IdlError {
    #[error("failed to read '{}'", .path.display())]
    #[diagnostic(code(protoidl::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {target}")]
    #[diagnostic(code(protoidl::write))]
    Write {
        target: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parser options in '{}'", .path.display())]
    #[diagnostic(code(protoidl::config), help("options accept `duplicate-messages` and `trailing-comma`"))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseDiagnostic),
}

impl IdlError {
    /// The underlying parse error, if this is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            IdlError::Parse(diagnostic) => Some(&diagnostic.error),
            _ => None,
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints any diagnostic with full miette rendering to stderr.
pub fn print_error<E>(error: E)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
