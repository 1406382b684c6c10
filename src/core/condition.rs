//! Run condition model
//!
//! A job's `only:` restriction compiles into a [`RunCondition`]: a list of
//! ref patterns, satisfied when any of them matches the trigger ref. The
//! predicate is pure so it can be tested without spawning anything.

use regex::Regex;

/// A single ref pattern (not serializable due to the Regex variant)
#[derive(Debug, Clone)]
pub enum RefPattern {
    /// Exact ref name match
    Exact(String),
    /// Regular expression match, written `/pattern/` in the descriptor
    Regex(Regex),
}

impl RefPattern {
    /// Parse a raw pattern string from the descriptor
    ///
    /// A value wrapped in forward slashes compiles as a regex; anything
    /// else is an exact ref name.
    pub fn parse(raw: &str) -> Result<Self, regex::Error> {
        if raw.len() > 2 && raw.starts_with('/') && raw.ends_with('/') {
            let inner = &raw[1..raw.len() - 1];
            Ok(RefPattern::Regex(Regex::new(inner)?))
        } else {
            Ok(RefPattern::Exact(raw.to_string()))
        }
    }

    /// Check if the pattern matches the given ref name
    pub fn matches(&self, git_ref: &str) -> bool {
        match self {
            RefPattern::Exact(name) => name == git_ref,
            RefPattern::Regex(regex) => regex.is_match(git_ref),
        }
    }
}

/// Run condition for a job: satisfied when any pattern matches
#[derive(Debug, Clone)]
pub struct RunCondition {
    pub patterns: Vec<RefPattern>,
}

impl RunCondition {
    pub fn new(patterns: Vec<RefPattern>) -> Self {
        Self { patterns }
    }

    /// Compile a condition from the raw `only:` list
    pub fn from_raw(raw: &[String]) -> Result<Self, regex::Error> {
        let patterns = raw
            .iter()
            .map(|p| RefPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Check if the condition is satisfied by the trigger ref
    pub fn satisfied_by(&self, git_ref: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(git_ref))
    }
}
