//! Glob-style `*` matching
//!
//! Two looseness levels share one pattern compiler:
//! - anchored equality, `*` matching any run of chars
//! - substring containment, switching to the anchored test when the pattern
//!   itself carries a `*`
//!
//! Callers lowercase both sides first. A search compiles its patterns once
//! into a [`PatternSet`] and reuses them for every record.

use std::collections::HashMap;

use regex::Regex;

/// A pattern with its regex compiled up front
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    text: String,
    matcher: Option<Regex>,
}

impl CompiledPattern {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let matcher = if is_glob(pattern) {
            let body = regex::escape(pattern).replace(r"\*", ".*");
            Regex::new(&format!("(?s)^{body}$")).ok()
        } else {
            None
        };
        Self {
            text: pattern.to_string(),
            matcher,
        }
    }

    /// Anchored match against the whole of `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        if is_glob(&self.text) {
            self.matcher.as_ref().is_some_and(|re| re.is_match(text))
        } else {
            self.text == text
        }
    }

    /// Substring containment, or the anchored match for a glob.
    #[must_use]
    pub fn found_in(&self, text: &str) -> bool {
        if is_glob(&self.text) {
            self.matches(text)
        } else {
            text.contains(self.text.as_str())
        }
    }
}

/// Compiled globs for one search, keyed by pattern text
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    compiled: HashMap<String, CompiledPattern>,
}

impl PatternSet {
    /// Compile every glob among `patterns`. Plain strings need no regex and
    /// are skipped.
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        let compiled = patterns
            .into_iter()
            .filter(|pattern| is_glob(pattern))
            .map(|pattern| (pattern.to_string(), CompiledPattern::new(pattern)))
            .collect();
        Self { compiled }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Anchored match of `pattern` against the whole of `text`.
    #[must_use]
    pub fn wildcard_match(&self, pattern: &str, text: &str) -> bool {
        if !is_glob(pattern) {
            return pattern == text;
        }
        match self.compiled.get(pattern) {
            Some(compiled) => compiled.matches(text),
            None => CompiledPattern::new(pattern).matches(text),
        }
    }

    /// Substring containment unless `pattern` carries a `*`.
    #[must_use]
    pub fn contains_match(&self, pattern: &str, text: &str) -> bool {
        if is_glob(pattern) {
            self.wildcard_match(pattern, text)
        } else {
            text.contains(pattern)
        }
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains('*')
}

/// One-off anchored match; compiles `pattern` on every call.
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    CompiledPattern::new(pattern).matches(text)
}

/// One-off substring containment unless `pattern` carries a `*`.
#[must_use]
pub fn contains_match(pattern: &str, text: &str) -> bool {
    CompiledPattern::new(pattern).found_in(text)
}
