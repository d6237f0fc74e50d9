//! Scan position over a normalized buffer.
//!
//! The cursor is the unit of backtracking: a `Mark` records where an attempt
//! started and `rewind` puts the cursor back there.

use super::normalize::Buffer;

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

impl Mark {
    /// Index of the next unread char at the time the mark was taken.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// An immutable buffer plus a mutable scan position.
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Buffer,
    /// Index of the next unread char. Everything before it is consumed.
    next: usize,
}

impl Cursor {
    pub fn new(buffer: Buffer) -> Self {
        Self { buffer, next: 0 }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Index of the last consumed char; `-1` before anything is consumed.
    pub fn position(&self) -> isize {
        self.next as isize - 1
    }

    /// Index of the next unread char.
    #[inline]
    pub fn offset(&self) -> usize {
        self.next
    }

    /// True once every char of the buffer has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.next >= self.buffer.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.buffer.get(self.next)
    }

    /// Consume and return the next char.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.next += 1;
        Some(c)
    }

    /// Consume `count` chars, stopping at the end of the buffer.
    pub fn advance_by(&mut self, count: usize) {
        self.next = (self.next + count).min(self.buffer.len());
    }

    /// Whether the unread text begins with `literal`.
    pub fn starts_with(&self, literal: &str) -> bool {
        let mut rest = self.buffer.tail(self.next).iter();
        literal.chars().all(|c| rest.next() == Some(&c))
    }

    pub fn mark(&self) -> Mark {
        Mark(self.next)
    }

    pub fn rewind(&mut self, mark: Mark) {
        debug_assert!(
            mark.0 <= self.buffer.len(),
            "mark {} out of bounds (max {})",
            mark.0,
            self.buffer.len()
        );
        self.next = mark.0;
    }
}
