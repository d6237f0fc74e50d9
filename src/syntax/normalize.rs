//! Source normalization.
//!
//! Comments are stripped and whitespace runs collapse to a single space, so the
//! engine works over one flat buffer and every position is a char index into it.

use once_cell::sync::Lazy;
use regex::Regex;

/// A comment runs from `#` through the end of its line, newline included.
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[^\n]*(\n|$)").unwrap());

/// The flat text every parse position indexes into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buffer {
    text: String,
    chars: Vec<char>,
}

impl Buffer {
    /// Wrap text that is already normalized.
    pub fn from_normalized(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self { text, chars }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Chars from `start` to the end of the buffer.
    pub fn tail(&self, start: usize) -> &[char] {
        self.chars.get(start..).unwrap_or(&[])
    }
}

/// Strip comments, then collapse whitespace runs into single spaces.
pub fn normalize(raw: &str) -> Buffer {
    let stripped = COMMENT.replace_all(raw, "");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    Buffer::from_normalized(text)
}
