//! Free-text corpus query.

use crate::domain::corpus::SearchKeys;

/// A lower-cased query split on single spaces.
///
/// `"a  b"` yields `["a", "", "b"]`; the empty token is contained in every
/// non-empty field. A query consisting only of whitespace
/// is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.to_lowercase();
        if normalized.trim().is_empty() {
            return Self { tokens: Vec::new() };
        }
        let tokens = normalized.split(' ').map(str::to_string).collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Relevance of one node: one point per matching field per token.
    pub fn score(&self, keys: &SearchKeys) -> u32 {
        self.tokens.iter().map(|token| keys.hits(token)).sum()
    }
}
