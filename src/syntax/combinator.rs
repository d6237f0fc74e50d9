//! Backtracking combinator engine.
//!
//! `Engine` owns the cursor and the range cache and provides the leaf
//! primitives (`char`, `keyword`, whitespace skipping). `choice` implements
//! ordered choice over named alternatives for any context that can hand out
//! its engine, rewinding after each failed attempt and reporting the failure
//! that got furthest into the buffer.

use tracing::trace;

use super::cursor::Cursor;
use super::normalize::Buffer;
use super::ranges::RangeCache;
use crate::errors::{ErrorKind, PResult, ParseError};

// ============================================================================
// ENGINE
// ============================================================================

/// Cursor plus compiled char classes for one parse.
#[derive(Debug)]
pub struct Engine {
    cursor: Cursor,
    ranges: RangeCache,
}

impl Engine {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            cursor: Cursor::new(buffer),
            ranges: RangeCache::new(),
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn ranges(&self) -> &RangeCache {
        &self.ranges
    }

    /// Consume the next char, restricted to `class` when one is given.
    ///
    /// Fails with `EndOfInput` when the buffer is exhausted and with
    /// `CharMismatch` when the char is outside the class. The cursor does not
    /// move on failure.
    pub fn char(&mut self, class: Option<&str>) -> PResult<char> {
        let at = self.cursor.offset();
        let Some(next) = self.cursor.peek() else {
            return Err(ParseError::new(
                at,
                ErrorKind::EndOfInput {
                    expected: match class {
                        Some(class) => format!("a character in [{}]", class),
                        None => "a character".into(),
                    },
                },
            ));
        };

        if let Some(class) = class {
            let set = self
                .ranges
                .get_or_compile(class)
                .map_err(|kind| ParseError::new(at, kind))?;
            if !set.matches(next) {
                return Err(ParseError::new(
                    at,
                    ErrorKind::CharMismatch {
                        expected: class.to_string(),
                        found: next,
                    },
                ));
            }
        }

        self.cursor.advance();
        Ok(next)
    }

    /// Like `char`, but a recoverable failure yields `None`.
    pub fn try_char(&mut self, class: Option<&str>) -> PResult<Option<char>> {
        recover(self.char(class))
    }

    /// Step over a single separator space, if one is next.
    pub fn skip_whitespace(&mut self) {
        if self.cursor.peek() == Some(' ') {
            self.cursor.advance();
        }
    }

    /// Match the first of `alternatives` found literally at the cursor.
    ///
    /// Whitespace is skipped before and after the literal. On failure the
    /// cursor is left where it was on entry.
    pub fn keyword<'k>(&mut self, alternatives: &[&'k str]) -> PResult<&'k str> {
        let entry = self.cursor.mark();
        self.skip_whitespace();
        let at = self.cursor.offset();

        if self.cursor.is_at_end() {
            self.cursor.rewind(entry);
            return Err(ParseError::new(
                at,
                ErrorKind::EndOfInput {
                    expected: format!("one of {}", alternatives.join(", ")),
                },
            ));
        }

        for &keyword in alternatives {
            if self.cursor.starts_with(keyword) {
                self.cursor.advance_by(keyword.chars().count());
                self.skip_whitespace();
                return Ok(keyword);
            }
        }

        self.cursor.rewind(entry);
        Err(ParseError::new(
            at,
            ErrorKind::KeywordMismatch {
                expected: alternatives.iter().map(|k| k.to_string()).collect(),
            },
        ))
    }

    /// Like `keyword`, but a mismatch yields `None`.
    pub fn try_keyword<'k>(&mut self, alternatives: &[&'k str]) -> Option<&'k str> {
        self.keyword(alternatives).ok()
    }
}

/// Turn a recoverable failure into `None`, passing fatal ones through.
fn recover<T>(result: PResult<T>) -> PResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err),
        Err(_) => Ok(None),
    }
}

// ============================================================================
// ORDERED CHOICE
// ============================================================================

/// Anything that drives an `Engine` and can therefore backtrack.
pub trait Backtrack {
    fn engine(&mut self) -> &mut Engine;
}

impl Backtrack for Engine {
    fn engine(&mut self) -> &mut Engine {
        self
    }
}

/// A named production usable as an ordered-choice alternative.
pub struct Alternative<C, T> {
    pub name: &'static str,
    pub rule: fn(&mut C) -> PResult<T>,
}

impl<C, T> Alternative<C, T> {
    pub const fn new(name: &'static str, rule: fn(&mut C) -> PResult<T>) -> Self {
        Self { name, rule }
    }
}

/// Try each alternative in order; the first success wins.
///
/// After a recoverable failure the cursor is rewound and the next alternative
/// is tried. When all fail, the error that reached furthest is returned, or an
/// `AmbiguousFailure` naming every alternative tied at that position. Fatal
/// errors are returned immediately. On any failure the cursor is back where it
/// was on entry.
pub fn choice<C: Backtrack, T>(ctx: &mut C, alternatives: &[Alternative<C, T>]) -> PResult<T> {
    let entry = ctx.engine().cursor().mark();
    ctx.engine().skip_whitespace();

    let mut deepest: Option<ParseError> = None;
    let mut tied: Vec<&'static str> = Vec::new();

    for alternative in alternatives {
        let start = ctx.engine().cursor().mark();
        match (alternative.rule)(ctx) {
            Ok(value) => {
                ctx.engine().skip_whitespace();
                return Ok(value);
            }
            Err(err) if err.is_fatal() => {
                ctx.engine().cursor_mut().rewind(entry);
                return Err(err);
            }
            Err(err) => {
                trace!(rule = alternative.name, position = err.position, "alternative failed");
                ctx.engine().cursor_mut().rewind(start);
                match deepest.as_ref().map(|d| d.position) {
                    Some(furthest) if err.position < furthest => {}
                    Some(furthest) if err.position == furthest => tied.push(alternative.name),
                    _ => {
                        tied = vec![alternative.name];
                        deepest = Some(err);
                    }
                }
            }
        }
    }

    ctx.engine().cursor_mut().rewind(entry);
    let Some(error) = deepest else {
        return Err(ParseError::new(
            entry.offset(),
            ErrorKind::Internal {
                message: "ordered choice over an empty alternative list".into(),
            },
        ));
    };

    if tied.len() == 1 {
        return Err(error);
    }
    let found = ctx.engine().cursor().buffer().get(error.position);
    Err(ParseError::new(
        error.position,
        ErrorKind::AmbiguousFailure { rules: tied, found },
    ))
}

/// Like `choice`, but a recoverable failure yields `None`.
pub fn try_choice<C: Backtrack, T>(
    ctx: &mut C,
    alternatives: &[Alternative<C, T>],
) -> PResult<Option<T>> {
    recover(choice(ctx, alternatives))
}
