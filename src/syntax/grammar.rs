//! IDL grammar.
//!
//! ```text
//! anyType       = complexType | primitiveType
//! complexType   = method | message
//! primitiveType = string
//! string        = [0-9A-Za-z[]]+
//! pair          = string ':' string
//! messageBody   = '{' (pair (',' pair)*)? '}'
//! message       = 'message' string messageBody
//! method        = 'method' string '(' string ')' '->' string ';'
//! ```
//!
//! Every production is built from the combinator engine. Declared messages go
//! into the registry as they are parsed; a method may only name messages that
//! are already there.

use tracing::{debug, info};

use super::combinator::{choice, try_choice, Alternative, Backtrack, Engine};
use super::cursor::Cursor;
use super::normalize::Buffer;
use crate::config::{DuplicatePolicy, ParseOptions, TrailingComma};
use crate::errors::{ErrorKind, MessageRole, PResult, ParseError};
use crate::ir::{FileDescriptor, MessageDescriptor, MessageRef, MessageRegistry, MethodDescriptor};

/// Chars allowed in names and type expressions.
pub const IDENTIFIER_CLASS: &str = "0-9A-Za-z[]";

/// What one top-level match produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Method(MethodDescriptor),
    Message {
        name: String,
        body: MessageDescriptor,
    },
    /// A lone identifier. Consumed without effect on the IR.
    Bare(String),
}

/// Everything a finished parse accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOutcome {
    pub file: FileDescriptor,
    pub registry: MessageRegistry,
}

/// Parse state for one input: engine plus the accumulators the productions fill.
#[derive(Debug)]
pub struct Grammar {
    engine: Engine,
    registry: MessageRegistry,
    file: FileDescriptor,
    options: ParseOptions,
}

impl Backtrack for Grammar {
    fn engine(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl Grammar {
    pub fn new(buffer: Buffer, options: ParseOptions) -> Self {
        Self {
            engine: Engine::new(buffer),
            registry: MessageRegistry::new(),
            file: FileDescriptor::new(),
            options,
        }
    }

    pub fn cursor(&self) -> &Cursor {
        self.engine.cursor()
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    pub fn file(&self) -> &FileDescriptor {
        &self.file
    }

    /// Match declarations until the buffer is exhausted.
    pub fn run(mut self) -> PResult<ParseOutcome> {
        while !self.engine.cursor().is_at_end() {
            let before = self.engine.cursor().offset();
            let declaration = self.declaration()?;
            if self.engine.cursor().offset() <= before {
                return Err(ParseError::new(
                    before,
                    ErrorKind::Internal {
                        message: "top-level declaration matched without consuming input".into(),
                    },
                ));
            }
            log_declaration(&declaration);
        }

        info!(
            methods = self.file.len(),
            messages = self.registry.len(),
            "parse complete"
        );
        Ok(ParseOutcome {
            file: self.file,
            registry: self.registry,
        })
    }

    // ========================================================================
    // PRODUCTIONS
    // ========================================================================

    pub fn declaration(&mut self) -> PResult<Declaration> {
        choice(self, &[Alternative::new("anyType", Self::any_type)])
    }

    pub fn any_type(&mut self) -> PResult<Declaration> {
        choice(
            self,
            &[
                Alternative::new("complexType", Self::complex_type),
                Alternative::new("primitiveType", Self::primitive_type),
            ],
        )
    }

    pub fn complex_type(&mut self) -> PResult<Declaration> {
        choice(
            self,
            &[
                Alternative::new("method", |g: &mut Self| g.method().map(Declaration::Method)),
                Alternative::new("message", |g: &mut Self| {
                    g.message().map(|(name, body)| Declaration::Message { name, body })
                }),
            ],
        )
    }

    pub fn primitive_type(&mut self) -> PResult<Declaration> {
        self.identifier().map(Declaration::Bare)
    }

    /// One or more identifier chars.
    pub fn string(&mut self) -> PResult<String> {
        let mut text = String::new();
        text.push(self.engine.char(Some(IDENTIFIER_CLASS))?);
        while let Some(c) = self.engine.try_char(Some(IDENTIFIER_CLASS))? {
            text.push(c);
        }
        Ok(text.trim_end_matches([' ', '\t']).to_string())
    }

    /// `string` as a named alternative, so surrounding whitespace is skipped.
    fn identifier(&mut self) -> PResult<String> {
        choice(self, &[Alternative::new("string", Self::string)])
    }

    pub fn pair(&mut self) -> PResult<(String, String)> {
        let name = self.identifier()?;
        self.engine.keyword(&[":"])?;
        let type_expr = self.identifier()?;
        Ok((name, type_expr))
    }

    /// `{ a: int32, b: bool }`.
    ///
    /// With `TrailingComma::Allow`, a comma that is not followed by a pair
    /// ends the field list instead of failing, so `{ a: int32, }` parses.
    /// With `TrailingComma::Reject`, `,}` is a committed `DanglingComma`.
    pub fn message_body(&mut self) -> PResult<MessageDescriptor> {
        const PAIR: &[Alternative<Grammar, (String, String)>] =
            &[Alternative::new("pair", Grammar::pair)];

        self.engine.keyword(&["{"])?;
        let mut body = MessageDescriptor::new();
        let mut after_comma = false;
        loop {
            let Some((name, type_expr)) = try_choice(self, PAIR)? else {
                if after_comma && self.options.trailing_comma == TrailingComma::Reject {
                    self.reject_dangling_comma()?;
                }
                break;
            };
            body.insert(name, type_expr);
            if self.engine.try_keyword(&[","]).is_none() {
                break;
            }
            after_comma = true;
        }
        self.engine.keyword(&["}"])?;
        Ok(body)
    }

    /// A comma directly followed by the closing brace. Anything else after the
    /// comma is left to the `}` check, which fails the same way in both modes.
    fn reject_dangling_comma(&mut self) -> PResult<()> {
        self.engine.skip_whitespace();
        let cursor = self.engine.cursor();
        match cursor.peek() {
            Some('}') => Err(ParseError::new(
                cursor.offset(),
                ErrorKind::DanglingComma { found: Some('}') },
            )),
            _ => Ok(()),
        }
    }

    pub fn message(&mut self) -> PResult<(String, MessageDescriptor)> {
        self.engine.keyword(&["message"])?;
        self.engine.skip_whitespace();
        let at = self.engine.cursor().offset();
        let name = self.string()?;
        self.engine.skip_whitespace();
        let body = self.message_body()?;

        if self.options.duplicate_messages == DuplicatePolicy::Reject
            && self.registry.contains(&name)
        {
            return Err(ParseError::new(at, ErrorKind::DuplicateMessage { name }));
        }
        if self.registry.register(name.clone(), body.clone()).is_some() {
            debug!(message = %name, "message redeclared, replacing earlier body");
        }
        Ok((name, body))
    }

    pub fn method(&mut self) -> PResult<MethodDescriptor> {
        self.engine.keyword(&["method"])?;
        let name = self.identifier()?;
        self.engine.keyword(&["("])?;
        let request = self.message_ref(MessageRole::Request)?;
        self.engine.keyword(&[")"])?;
        self.engine.keyword(&["->"])?;
        let response = self.message_ref(MessageRole::Response)?;
        self.engine.keyword(&[";"])?;

        let method = MethodDescriptor {
            name,
            request,
            response,
        };
        self.file.push(method.clone());
        Ok(method)
    }

    /// A message name that must already be registered.
    fn message_ref(&mut self, role: MessageRole) -> PResult<MessageRef> {
        self.engine.skip_whitespace();
        let at = self.engine.cursor().offset();
        let name = self.identifier()?;
        self.registry
            .resolve(&name)
            .ok_or_else(|| ParseError::new(at, ErrorKind::UndefinedMessage { role, name }))
    }
}

fn log_declaration(declaration: &Declaration) {
    match declaration {
        Declaration::Method(method) => debug!(
            method = %method.name,
            request = %method.request.name,
            response = %method.response.name,
            "parsed method"
        ),
        Declaration::Message { name, body } => {
            debug!(message = %name, fields = body.len(), "parsed message")
        }
        Declaration::Bare(token) => debug!(%token, "skipped bare identifier"),
    }
}
