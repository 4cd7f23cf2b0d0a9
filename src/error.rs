//! Error types for RECON parsing.
//!
//! Every recoverable failure is a syntax error detected by a grammar rule and
//! surfaced through the parser's `Fail` outcome; the remaining cursor in that
//! outcome marks the position. No partial value ever escapes a failed parse.
//!
//! Malformed *state* (a character the grammar already validated reaching a
//! decode step that cannot represent it) is a bug, not an input error, and
//! panics instead of producing a `ParseError`.
//!
//! ## Examples
//!
//! ```rust
//! use recon::{parse, ParseError};
//!
//! let err = parse("1.").unwrap_err();
//! assert_eq!(err, ParseError::UnexpectedEof);
//!
//! let err = parse("{1 2}").unwrap_err();
//! assert!(matches!(err, ParseError::Expected { .. }));
//! ```

use thiserror::Error;

/// A RECON syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A grammar rule required one kind of token and saw another character.
    #[error("expected {expected}, but found {found:?}")]
    Expected {
        expected: &'static str,
        found: char,
    },

    /// A grammar rule required a token and the available input ran out.
    #[error("unexpected {expected}")]
    Unexpected { expected: &'static str },

    /// The source closed while a grammar rule still needed more input.
    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl ParseError {
    /// Error for a rule that wanted `expected` at the given head character,
    /// or at exhausted input when there is no head.
    pub(crate) fn expected(expected: &'static str, found: Option<char>) -> Self {
        match found {
            Some(found) => ParseError::Expected { expected, found },
            None => ParseError::Unexpected { expected },
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
