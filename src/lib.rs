//! # recon
//!
//! Parser and serializer for RECON, a human-writable structured text
//! notation. RECON is a superset of JSON that adds attributes, markup, and
//! binary data literals:
//!
//! ```text
//! @html {
//!   @body {
//!     [Hello, @em[world]!]
//!   }
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Incremental parsing**: the parser is a resumable state machine that
//!   suspends mid-token when input runs out, so documents arriving in chunks
//!   over a network parse without buffering
//! - **Uniform scalar/record model**: `1` parses to a number, `1,2` to a
//!   record, through one set of rules
//! - **Round-trippable serializer**: values print back using the same
//!   block, markup, and attribute syntax the parser accepts
//! - **Serde interop**: [`Value`] implements `Serialize`/`Deserialize`, so
//!   JSON documents convert straight into RECON values
//!
//! ## Quick Start
//!
//! ```rust
//! use recon::{parse, Value};
//!
//! let value = parse("@event(onClick), {from: me, to: you}").unwrap();
//! assert_eq!(value.get_item(1).value().get("from"), &Value::from("me"));
//!
//! // Scalars stay scalars; items promote to records.
//! assert_eq!(parse("1").unwrap(), Value::Number(1.0));
//! assert_eq!(parse("1,").unwrap(), Value::Number(1.0));
//! assert!(parse("1,2").unwrap().is_record());
//! ```
//!
//! ## Serialization
//!
//! ```rust
//! use recon::parse;
//!
//! let value = parse("{from: me, to: you}").unwrap();
//! assert_eq!(value.to_recon(), "{from:me,to:you}");
//! assert_eq!(value.to_recon_block(), "from:me,to:you");
//! ```
//!
//! ## Chunked Parsing
//!
//! Network input rarely arrives whole. A suspended [`Parser`] holds exactly
//! the partial token it needs to resume — never the raw unconsumed input:
//!
//! ```rust
//! use recon::{Input, Outcome, Parser};
//!
//! let mut state = Parser::document();
//! for chunk in ["@user(na", "me: \"Ali", "ce\")"] {
//!     state = match state.run(Input::text(chunk)) {
//!         Outcome::Cont(next, _) => next,
//!         outcome => panic!("unexpected {outcome:?}"),
//!     };
//! }
//! // Closing the source forces pending rules to resolve.
//! let value = match state.run(Input::done()) {
//!     Outcome::Done(parsed, _) => parsed.into_value(),
//!     outcome => panic!("unexpected {outcome:?}"),
//! };
//! assert_eq!(value.to_recon(), "@user(name:\"Alice\")");
//! ```
//!
//! ## Grammar Sketch
//!
//! - Items are separated by `,`, `;`, or newline; a trailing separator is
//!   allowed; two bare items with no separator are an error
//! - `@name(block)` attributes attach to adjacent items without a separator
//! - `key: value` slots pair arbitrary keys with values; a missing value is
//!   [`Extant`](Value::Extant)
//! - `"…"` strings escape `" \ / @ { } [ ]` and `\b \f \n \r \t`;
//!   unquoted identifiers cover Unicode name characters
//! - Numbers are JSON-shaped: `-?(0|[1-9][0-9]*)(.[0-9]+)?([eE][+-]?[0-9]+)?`
//! - `%AAAA` data literals hold base64 (both `+/` and `-_` accepted)
//! - `{…}` records and `[…]` markup nest freely

pub mod builder;
pub mod data;
pub mod error;
mod hash;
pub mod input;
pub mod parser;
mod ser;
pub mod value;

pub use builder::{Builder, RecordBuilder, ValueBuilder};
pub use data::Data;
pub use error::{ParseError, Result};
pub use input::Input;
pub use parser::{Outcome, Parsed, Parser};
pub use value::{Field, Item, Record, Value};

/// Parses a complete RECON document into a [`Value`].
///
/// Empty input yields [`Value::Absent`]. Trailing input after a complete
/// document is an error.
///
/// # Examples
///
/// ```rust
/// use recon::{parse, Value};
///
/// assert_eq!(parse("42").unwrap(), Value::Number(42.0));
/// assert!(parse("{a: 1, b: 2}").unwrap().is_record());
/// assert!(parse("{unterminated").is_err());
/// ```
///
/// # Errors
///
/// Returns the first syntax error encountered; no partial value is exposed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    let outcome = Parser::document().run(Input::text(text));
    let outcome = match outcome {
        Outcome::Cont(next, _) => next.run(Input::done()),
        outcome => outcome,
    };
    match outcome {
        Outcome::Done(parsed, _) => Ok(parsed.into_value()),
        Outcome::Fail(error, _) => Err(error),
        // Terminal input forces every rule to resolve.
        Outcome::Cont(_, _) => unreachable!("parser suspended on terminal input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let value = parse("@event(onClick), @command()").unwrap();
        let text = value.to_recon();
        assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn test_empty_input_is_absent() {
        assert_eq!(parse("").unwrap(), Value::Absent);
    }

    #[test]
    fn test_trailing_input_is_an_error() {
        assert!(parse("1 2").is_err());
        assert!(parse("{}{}").is_err());
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("false").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_display_prints_recon() {
        let value = parse("{a: 1}").unwrap();
        assert_eq!(value.to_string(), "{a:1}");
    }

    #[test]
    fn test_serde_json_interop() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"count": 2, "from": "me"}"#).unwrap();
        let value: Value = serde_json::from_value(json).unwrap();
        assert_eq!(value.to_recon_block(), "count:2,from:me");
    }
}
