//! Wildcard Matcher
//!
//! `*` matches any run of characters (including none), `?` exactly one.
//! Matching is case-sensitive over the whole key; `/` has no special meaning.

use crate::storage::names::WILDCARDS;

/// Whether a key must go through pattern matching instead of an exact lookup
///
/// An empty key means "everything".
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.is_empty() || pattern.contains(WILDCARDS)
}

/// A compiled key pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardPattern {
    /// `""` or `*`: accept everything without looking
    All,

    /// Anything else
    Glob(Vec<Token>),
}

/// Pattern element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(char),
    /// `?`
    One,
    /// `*`, consecutive stars folded into one
    Any,
}

impl WildcardPattern {
    /// Compile a pattern
    pub fn compile(pattern: &str) -> Self {
        let mut tokens = Vec::with_capacity(pattern.len());
        for c in pattern.chars() {
            let token = match c {
                '*' => Token::Any,
                '?' => Token::One,
                c => Token::Literal(c),
            };
            if token == Token::Any && tokens.last() == Some(&Token::Any) {
                continue;
            }
            tokens.push(token);
        }

        match tokens.as_slice() {
            [] | [Token::Any] => WildcardPattern::All,
            _ => WildcardPattern::Glob(tokens),
        }
    }

    /// Test a single key
    pub fn matches(&self, key: &str) -> bool {
        match self {
            WildcardPattern::All => true,
            WildcardPattern::Glob(tokens) => glob_match(tokens, key),
        }
    }

    /// Keep the candidates that match, preserving their order
    pub fn filter(&self, candidates: &[String]) -> Vec<String> {
        match self {
            WildcardPattern::All => candidates.to_vec(),
            WildcardPattern::Glob(_) => candidates
                .iter()
                .filter(|k| self.matches(k))
                .cloned()
                .collect(),
        }
    }
}

/// Iterative glob match with single-star backtracking
fn glob_match(tokens: &[Token], key: &str) -> bool {
    let text: Vec<char> = key.chars().collect();
    let (mut p, mut t) = (0usize, 0usize);
    // Position of the last `*` and the text index it is currently absorbing up to
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Any) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(Token::One) => {
                p += 1;
                t += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    p = star + 1;
                    t = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|token| *token == Token::Any)
}
