//! The user-supplied company identifier.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query is empty")]
    Empty,

    #[error("query is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
}

/// A company name or domain, trimmed and guaranteed non-empty.
///
/// Domain-shaped queries may omit the scheme (`stripe.com`); the source
/// clients normalize them before use as HTTP targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Parse raw user input into a `Query`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Empty`] for blank input and
    /// [`QueryError::TooLong`] past [`MAX_QUERY_CHARS`].
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_QUERY_CHARS {
            return Err(QueryError::TooLong {
                len,
                max: MAX_QUERY_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the query looks like a host or URL rather than a company name.
    #[must_use]
    pub fn is_domain_like(&self) -> bool {
        let s = self.0.as_str();
        if s.chars().any(char::is_whitespace) {
            return false;
        }
        if s.contains("://") {
            return true;
        }
        let host = s.split('/').next().unwrap_or(s);
        host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let q = Query::parse("  stripe.com \n").unwrap();
        assert_eq!(q.as_str(), "stripe.com");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(Query::parse("   ").unwrap_err(), QueryError::Empty);
        assert_eq!(Query::parse("").unwrap_err(), QueryError::Empty);
    }

    #[test]
    fn parse_rejects_overlong_input() {
        let raw = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(matches!(
            Query::parse(&raw),
            Err(QueryError::TooLong { len, .. }) if len == MAX_QUERY_CHARS + 1
        ));
    }

    #[test]
    fn domain_like_detection() {
        assert!(Query::parse("stripe.com").unwrap().is_domain_like());
        assert!(Query::parse("https://linear.app/about")
            .unwrap()
            .is_domain_like());
        assert!(!Query::parse("Salesforce").unwrap().is_domain_like());
        assert!(!Query::parse("Open AI Inc.").unwrap().is_domain_like());
    }
}
