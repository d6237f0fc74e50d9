//! Character-class compilation.
//!
//! A class spec such as `0-9A-Za-z[]` is read left to right: a three-char window
//! `X-Y` is an inclusive range, anything else is a single char. Compiled sets are
//! cached per spec for the lifetime of one parse.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::ErrorKind;

/// One element of a compiled class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharRange {
    Single(char),
    /// Inclusive, with `low < high`.
    Inclusive(char, char),
}

impl CharRange {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharRange::Single(single) => single == c,
            CharRange::Inclusive(low, high) => (low..=high).contains(&c),
        }
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharRange::Single(c) => write!(f, "{}", c),
            CharRange::Inclusive(low, high) => write!(f, "{}-{}", low, high),
        }
    }
}

/// An ordered list of ranges compiled from a spec string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharRangeSet {
    spec: String,
    elements: Vec<CharRange>,
}

impl CharRangeSet {
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn elements(&self) -> &[CharRange] {
        &self.elements
    }

    pub fn matches(&self, c: char) -> bool {
        self.elements.iter().any(|range| range.contains(c))
    }
}

/// Compile a class spec. Fails with `InvalidRange` when a range's lower bound
/// does not strictly precede its upper bound.
pub fn compile_ranges(spec: &str) -> Result<CharRangeSet, ErrorKind> {
    let chars: Vec<char> = spec.chars().collect();
    let mut elements = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let (low, high) = (chars[i], chars[i + 2]);
            if low >= high {
                return Err(ErrorKind::InvalidRange {
                    spec: spec.to_string(),
                    low,
                    high,
                });
            }
            elements.push(CharRange::Inclusive(low, high));
            i += 3;
        } else {
            elements.push(CharRange::Single(chars[i]));
            i += 1;
        }
    }

    Ok(CharRangeSet {
        spec: spec.to_string(),
        elements,
    })
}

/// Memoizes compiled classes by their spec string.
#[derive(Debug, Default)]
pub struct RangeCache {
    entries: HashMap<String, Rc<CharRangeSet>>,
}

impl RangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&mut self, spec: &str) -> Result<Rc<CharRangeSet>, ErrorKind> {
        if let Some(set) = self.entries.get(spec) {
            return Ok(Rc::clone(set));
        }
        let set = Rc::new(compile_ranges(spec)?);
        self.entries.insert(spec.to_string(), Rc::clone(&set));
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(set: &CharRangeSet) -> Vec<String> {
        set.elements().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_identifier_class() {
        let set = compile_ranges("0-9A-Za-z[]").unwrap();
        assert_eq!(rendered(&set), vec!["0-9", "A-Z", "a-z", "[", "]"]);
    }

    #[test]
    fn test_reversed_range_fails() {
        let err = compile_ranges("z-a").unwrap_err();
        assert_eq!(
            err,
            ErrorKind::InvalidRange {
                spec: "z-a".into(),
                low: 'z',
                high: 'a'
            }
        );
    }

    #[test]
    fn test_equal_bounds_fail() {
        assert!(compile_ranges("a-a").is_err());
    }

    #[test]
    fn test_trailing_dash_is_single() {
        let set = compile_ranges("a-").unwrap();
        assert_eq!(rendered(&set), vec!["a", "-"]);
        assert!(set.matches('-'));
    }

    #[test]
    fn test_matches() {
        let set = compile_ranges("0-9A-Za-z[]").unwrap();
        for c in ['0', '9', 'A', 'q', 'Z', '[', ']'] {
            assert!(set.matches(c), "{c} should match");
        }
        for c in [' ', '{', ':', ',', '-', '_'] {
            assert!(!set.matches(c), "{c} should not match");
        }
    }

    #[test]
    fn test_cache_reuses_compiled_set() {
        let mut cache = RangeCache::new();
        let first = cache.get_or_compile("a-z").unwrap();
        let second = cache.get_or_compile("a-z").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_compile("9-0").is_err());
        assert_eq!(cache.len(), 1);
    }
}
