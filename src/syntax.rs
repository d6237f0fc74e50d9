//! Syntax module for the interface-definition language
//!
//! Raw text is normalized into a flat buffer, then a backtracking
//! recursive-descent grammar walks it and produces the method IR.

pub mod combinator;
pub mod cursor;
pub mod grammar;
pub mod normalize;
pub mod parser;
pub mod ranges;

pub use combinator::{choice, try_choice, Alternative, Backtrack, Engine};
pub use grammar::{Declaration, Grammar, ParseOutcome, IDENTIFIER_CLASS};
pub use normalize::{normalize, Buffer};
pub use parser::{parse, parse_file, IdlParser};
pub use ranges::{compile_ranges, CharRange, CharRangeSet};
