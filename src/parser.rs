//! The incremental RECON parser.
//!
//! Each grammar production is one variant of [`Parser`], carrying exactly the
//! data needed to resume mid-token: the partial literal, the nested sub-state,
//! the builder accumulated so far. Feeding a state consumes it and yields an
//! [`Outcome`]:
//!
//! - [`Outcome::Cont`] — the rule is incomplete; re-feed the returned state
//!   once more input exists (or feed [`Input::done`] to force resolution)
//! - [`Outcome::Done`] — the rule produced its result, with the unconsumed
//!   input handed back for the enclosing rule
//! - [`Outcome::Fail`] — a syntax error; terminal for this parse
//!
//! The [`run`](Parser::run) driver is an iterative trampoline: it advances
//! while progress is possible and suspends — returning `Cont` — exactly when
//! input is exhausted but the source is still open. That suspension is what
//! makes chunked parsing work without buffering: no state ever holds raw
//! unconsumed input, only its own accumulator.
//!
//! ## Examples
//!
//! One-shot parsing is [`crate::parse`]. Chunked parsing drives the machine
//! by hand:
//!
//! ```rust
//! use recon::{Input, Outcome, Parser, Value};
//!
//! let mut state = Parser::document();
//! for chunk in ["{a: 1, b", ": 2}"] {
//!     state = match state.run(Input::text(chunk)) {
//!         Outcome::Cont(next, _) => next,
//!         outcome => panic!("unexpected {outcome:?}"),
//!     };
//! }
//! match state.run(Input::done()) {
//!     Outcome::Done(parsed, _) => {
//!         assert_eq!(parsed.into_value().get("b"), &Value::Number(2.0));
//!     }
//!     outcome => panic!("unexpected {outcome:?}"),
//! }
//! ```

use crate::builder::Builder;
use crate::data::{is_base64_char, Base64Decoder};
use crate::error::ParseError;
use crate::input::Input;
use crate::value::{Field, Value};

/// The result of feeding input to a parser state.
#[derive(Clone, Debug)]
pub enum Outcome<'a> {
    /// The rule needs more input; resume the returned state.
    Cont(Parser, Input<'a>),
    /// The rule matched and produced a result.
    Done(Parsed, Input<'a>),
    /// Syntax error; the cursor marks the position.
    Fail(ParseError, Input<'a>),
}

impl<'a> Outcome<'a> {
    #[inline]
    #[must_use]
    pub fn is_cont(&self) -> bool {
        matches!(self, Outcome::Cont(_, _))
    }

    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_, _))
    }

    #[inline]
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_, _))
    }
}

/// The result of a completed grammar production.
///
/// Token rules yield their literal kinds; container and block rules yield
/// values or hand a builder back to the enclosing rule. [`into_value`]
/// converts any literal result into a [`Value`], folding the identifiers
/// `true` and `false` into booleans.
///
/// [`into_value`]: Parsed::into_value
#[derive(Clone, Debug)]
pub enum Parsed {
    Value(Value),
    Field(Field),
    Ident(String),
    Text(String),
    Number(f64),
    Data(crate::data::Data),
    Builder(Builder),
}

impl Parsed {
    /// The produced value.
    ///
    /// # Panics
    ///
    /// Panics on a `Field` or `Builder` result; those only occur inside
    /// productions that consume them directly, so reaching this is a bug.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Parsed::Value(value) => value,
            Parsed::Ident(name) => match name.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Text(name),
            },
            Parsed::Text(text) => Value::Text(text),
            Parsed::Number(number) => Value::Number(number),
            Parsed::Data(data) => Value::Data(data),
            Parsed::Field(_) | Parsed::Builder(_) => {
                unreachable!("field or builder result where a value was required")
            }
        }
    }

    fn into_field(self) -> Field {
        match self {
            Parsed::Field(field) => field,
            _ => unreachable!("non-field result from an attribute rule"),
        }
    }

    fn into_ident(self) -> String {
        match self {
            Parsed::Ident(name) => name,
            _ => unreachable!("non-identifier result from the identifier rule"),
        }
    }

    fn into_builder(self) -> Builder {
        match self {
            Parsed::Builder(builder) => builder,
            _ => unreachable!("non-builder result from a container rule"),
        }
    }
}

/// A suspended (or initial) parser state: one variant per grammar production.
#[derive(Clone, Debug)]
pub enum Parser {
    /// Top-level document: a block, then end of input.
    Document { inner: Box<Parser> },
    /// Separator-joined items, accumulating into a value builder.
    Block { builder: Builder },
    BlockKey { inner: Box<Parser>, builder: Builder },
    BlockKeyRest { key: Value, builder: Builder },
    BlockKeyThenValue { key: Value, builder: Builder },
    BlockKeyValue { key: Value, inner: Box<Parser>, builder: Builder },
    BlockSeparator { builder: Builder },
    /// `@` introducing an attribute.
    Attr,
    AttrIdent { inner: Box<Parser> },
    AttrIdentRest { name: String },
    AttrParamBlock { name: String },
    AttrParam { name: String, inner: Box<Parser> },
    AttrParamRest { name: String, value: Value },
    /// One item of a block: an attributed value, a container, or a literal.
    BlockItem { builder: Option<Builder> },
    BlockItemField { inner: Box<Parser>, builder: Option<Builder> },
    BlockItemFieldRest { builder: Builder },
    BlockItemValue { inner: Box<Parser>, builder: Option<Builder> },
    BlockItemInner { inner: Box<Parser> },
    BlockItemRest { builder: Builder },
    /// `{` … `}` container, appending into the builder it was handed.
    RecordStart { builder: Builder },
    RecordKey { builder: Builder },
    RecordItem { inner: Box<Parser>, builder: Builder },
    RecordItemRest { key: Value, builder: Builder },
    RecordItemThenValue { key: Value, builder: Builder },
    RecordItemValue { key: Value, inner: Box<Parser>, builder: Builder },
    RecordSeparator { builder: Builder },
    /// `[` … `]` markup, appending into the builder it was handed.
    MarkupStart { builder: Builder },
    MarkupText { text: String, builder: Builder },
    MarkupValue { inner: Box<Parser>, builder: Builder },
    MarkupInner { inner: Box<Parser> },
    MarkupEscape { text: String, builder: Builder },
    /// An `@`-item embedded in markup: one attribute, optionally glued to a
    /// `{…}` or `[…]` body.
    InlineItemField { inner: Box<Parser> },
    InlineItemRest { builder: Builder },
    InlineItemInner { inner: Box<Parser> },
    /// Identifier token.
    Ident,
    IdentRest { ident: String },
    /// Quoted string token.
    StringLit,
    StringRest { text: String },
    StringEscape { text: String },
    /// Numeric token.
    Number,
    NumberIntegral { literal: String },
    NumberIntegralRest { literal: String },
    NumberRest { literal: String },
    NumberFractional { literal: String },
    NumberFractionalRest { literal: String },
    NumberFractionalExponent { literal: String },
    NumberExponential { literal: String },
    NumberExponentialPart { literal: String },
    NumberExponentialRest { literal: String },
    /// `%` base64 data token.
    DataLit,
    DataRest { decoder: Base64Decoder, state: u8 },
}

impl Parser {
    /// The initial state for a complete RECON document.
    #[must_use]
    pub fn document() -> Parser {
        Parser::Document {
            inner: Box::new(Parser::block()),
        }
    }

    /// The initial state for a block (used standalone by attribute
    /// parameter lists).
    #[must_use]
    pub fn block() -> Parser {
        Parser::Block {
            builder: Builder::value(),
        }
    }

    fn block_item(builder: Option<Builder>) -> Parser {
        Parser::BlockItem { builder }
    }

    fn record(builder: Builder) -> Parser {
        Parser::RecordStart { builder }
    }

    fn markup(builder: Builder) -> Parser {
        Parser::MarkupStart { builder }
    }

    /// Advances this state as far as the available input allows.
    ///
    /// Returns `Cont` with a suspended state once the cursor is exhausted but
    /// not done; feeding [`Input::done`] instead forces every pending rule to
    /// resolve, so the result is then always `Done` or `Fail`.
    pub fn run(self, input: Input) -> Outcome {
        let mut outcome = Outcome::Cont(self, input);
        loop {
            match outcome {
                Outcome::Cont(next, remaining)
                    if !remaining.is_empty() || remaining.is_done() =>
                {
                    outcome = next.feed(remaining);
                }
                _ => return outcome,
            }
        }
    }

    /// Feeds one round of input to this state.
    ///
    /// Most callers want [`run`](Parser::run), which loops until the state
    /// suspends or resolves.
    pub fn feed(self, input: Input) -> Outcome {
        match self {
            Parser::Document { inner } => feed_document(*inner, input),
            Parser::Block { builder } => feed_block(builder, input),
            Parser::BlockKey { inner, builder } => feed_block_key(*inner, builder, input),
            Parser::BlockKeyRest { key, builder } => feed_block_key_rest(key, builder, input),
            Parser::BlockKeyThenValue { key, builder } => {
                feed_block_key_then_value(key, builder, input)
            }
            Parser::BlockKeyValue { key, inner, builder } => {
                feed_block_key_value(key, *inner, builder, input)
            }
            Parser::BlockSeparator { builder } => feed_block_separator(builder, input),
            Parser::Attr => feed_attr(input),
            Parser::AttrIdent { inner } => feed_attr_ident(*inner, input),
            Parser::AttrIdentRest { name } => feed_attr_ident_rest(name, input),
            Parser::AttrParamBlock { name } => feed_attr_param_block(name, input),
            Parser::AttrParam { name, inner } => feed_attr_param(name, *inner, input),
            Parser::AttrParamRest { name, value } => feed_attr_param_rest(name, value, input),
            Parser::BlockItem { builder } => feed_block_item(builder, input),
            Parser::BlockItemField { inner, builder } => {
                feed_block_item_field(*inner, builder, input)
            }
            Parser::BlockItemFieldRest { builder } => feed_block_item_field_rest(builder, input),
            Parser::BlockItemValue { inner, builder } => {
                feed_block_item_value(*inner, builder, input)
            }
            Parser::BlockItemInner { inner } => feed_block_item_inner(*inner, input),
            Parser::BlockItemRest { builder } => feed_block_item_rest(builder, input),
            Parser::RecordStart { builder } => feed_record_start(builder, input),
            Parser::RecordKey { builder } => feed_record_key(builder, input),
            Parser::RecordItem { inner, builder } => feed_record_item(*inner, builder, input),
            Parser::RecordItemRest { key, builder } => feed_record_item_rest(key, builder, input),
            Parser::RecordItemThenValue { key, builder } => {
                feed_record_item_then_value(key, builder, input)
            }
            Parser::RecordItemValue { key, inner, builder } => {
                feed_record_item_value(key, *inner, builder, input)
            }
            Parser::RecordSeparator { builder } => feed_record_separator(builder, input),
            Parser::MarkupStart { builder } => feed_markup_start(builder, input),
            Parser::MarkupText { text, builder } => feed_markup_text(text, builder, input),
            Parser::MarkupValue { inner, builder } => feed_markup_value(*inner, builder, input),
            Parser::MarkupInner { inner } => feed_markup_inner(*inner, input),
            Parser::MarkupEscape { text, builder } => feed_markup_escape(text, builder, input),
            Parser::InlineItemField { inner } => feed_inline_item_field(*inner, input),
            Parser::InlineItemRest { builder } => feed_inline_item_rest(builder, input),
            Parser::InlineItemInner { inner } => feed_inline_item_inner(*inner, input),
            Parser::Ident => feed_ident(input),
            Parser::IdentRest { ident } => feed_ident_rest(ident, input),
            Parser::StringLit => feed_string(input),
            Parser::StringRest { text } => feed_string_rest(text, input),
            Parser::StringEscape { text } => feed_string_escape(text, input),
            Parser::Number => feed_number(input),
            Parser::NumberIntegral { literal } => feed_number_integral(literal, input),
            Parser::NumberIntegralRest { literal } => feed_number_integral_rest(literal, input),
            Parser::NumberRest { literal } => feed_number_rest(literal, input),
            Parser::NumberFractional { literal } => feed_number_fractional(literal, input),
            Parser::NumberFractionalRest { literal } => {
                feed_number_fractional_rest(literal, input)
            }
            Parser::NumberFractionalExponent { literal } => {
                feed_number_fractional_exponent(literal, input)
            }
            Parser::NumberExponential { literal } => feed_number_exponential(literal, input),
            Parser::NumberExponentialPart { literal } => {
                feed_number_exponential_part(literal, input)
            }
            Parser::NumberExponentialRest { literal } => {
                feed_number_exponential_rest(literal, input)
            }
            Parser::DataLit => feed_data(input),
            Parser::DataRest { decoder, state } => feed_data_rest(decoder, state, input),
        }
    }
}

fn fail_expected<'a>(expected: &'static str, input: Input<'a>) -> Outcome<'a> {
    Outcome::Fail(ParseError::expected(expected, input.head()), input)
}

fn fail_eof(input: Input) -> Outcome {
    Outcome::Fail(ParseError::UnexpectedEof, input)
}

fn skip_while<'a>(mut input: Input<'a>, pred: fn(char) -> bool) -> Input<'a> {
    while let Some(c) = input.head() {
        if pred(c) {
            input = input.tail();
        } else {
            break;
        }
    }
    input
}

// Document

fn feed_document<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    let had_input = !input.is_empty();
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::Document {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(_, remaining) if had_input => fail_expected("end of input", remaining),
        outcome => outcome,
    }
}

// Block chain

fn feed_block(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_whitespace);
    if let Some(c) = input.head() {
        if is_block_item_start(c) {
            Outcome::Cont(
                Parser::BlockKey {
                    inner: Box::new(Parser::block_item(None)),
                    builder,
                },
                input,
            )
        } else {
            fail_expected("block value", input)
        }
    } else if input.is_done() {
        Outcome::Done(Parsed::Value(builder.into_value()), input)
    } else {
        Outcome::Cont(Parser::Block { builder }, input)
    }
}

fn feed_block_key<'a>(inner: Parser, mut builder: Builder, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::BlockKey {
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            let key = parsed.into_value();
            if remaining.is_done() {
                builder.push_value(key);
                Outcome::Done(Parsed::Value(builder.into_value()), remaining)
            } else {
                Outcome::Cont(Parser::BlockKeyRest { key, builder }, remaining)
            }
        }
        outcome => outcome,
    }
}

fn feed_block_key_rest(key: Value, mut builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if input.head() == Some(':') {
        Outcome::Cont(Parser::BlockKeyThenValue { key, builder }, input.tail())
    } else if !input.is_empty() {
        builder.push_value(key);
        Outcome::Cont(Parser::BlockSeparator { builder }, input)
    } else if input.is_done() {
        builder.push_value(key);
        Outcome::Done(Parsed::Value(builder.into_value()), input)
    } else {
        Outcome::Cont(Parser::BlockKeyRest { key, builder }, input)
    }
}

fn feed_block_key_then_value(key: Value, mut builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if !input.is_empty() {
        Outcome::Cont(
            Parser::BlockKeyValue {
                key,
                inner: Box::new(Parser::block_item(None)),
                builder,
            },
            input,
        )
    } else if input.is_done() {
        builder.push_slot(key, Value::Extant);
        Outcome::Done(Parsed::Value(builder.into_value()), input)
    } else {
        Outcome::Cont(Parser::BlockKeyThenValue { key, builder }, input)
    }
}

fn feed_block_key_value<'a>(
    key: Value,
    inner: Parser,
    mut builder: Builder,
    input: Input<'a>,
) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::BlockKeyValue {
                key,
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            builder.push_slot(key, parsed.into_value());
            Outcome::Cont(Parser::BlockSeparator { builder }, remaining)
        }
        outcome => outcome,
    }
}

fn feed_block_separator(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    match input.head() {
        Some(c) if c == ',' || c == ';' || is_newline(c) => {
            Outcome::Cont(Parser::Block { builder }, input.tail())
        }
        Some(_) => Outcome::Done(Parsed::Value(builder.into_value()), input),
        None if input.is_done() => Outcome::Done(Parsed::Value(builder.into_value()), input),
        None => Outcome::Cont(Parser::BlockSeparator { builder }, input),
    }
}

// Attribute chain

fn feed_attr(input: Input) -> Outcome {
    if input.head() == Some('@') {
        Outcome::Cont(
            Parser::AttrIdent {
                inner: Box::new(Parser::Ident),
            },
            input.tail(),
        )
    } else if !input.is_empty() {
        fail_expected("attribute", input)
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::Attr, input)
    }
}

fn feed_attr_ident<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::AttrIdent {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            let name = parsed.into_ident();
            if remaining.is_done() {
                Outcome::Done(Parsed::Field(Field::Attr(name, Value::Extant)), remaining)
            } else {
                Outcome::Cont(Parser::AttrIdentRest { name }, remaining)
            }
        }
        outcome => outcome,
    }
}

fn feed_attr_ident_rest(name: String, input: Input) -> Outcome {
    if input.head() == Some('(') {
        Outcome::Cont(Parser::AttrParamBlock { name }, input.tail())
    } else if !input.is_empty() || input.is_done() {
        Outcome::Done(Parsed::Field(Field::Attr(name, Value::Extant)), input)
    } else {
        Outcome::Cont(Parser::AttrIdentRest { name }, input)
    }
}

fn feed_attr_param_block(name: String, input: Input) -> Outcome {
    let input = skip_while(input, is_whitespace);
    if input.head() == Some(')') {
        Outcome::Done(
            Parsed::Field(Field::Attr(name, Value::Extant)),
            input.tail(),
        )
    } else if !input.is_empty() {
        Outcome::Cont(
            Parser::AttrParam {
                name,
                inner: Box::new(Parser::block()),
            },
            input,
        )
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::AttrParamBlock { name }, input)
    }
}

fn feed_attr_param<'a>(name: String, inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::AttrParam {
                name,
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => Outcome::Cont(
            Parser::AttrParamRest {
                name,
                value: parsed.into_value(),
            },
            remaining,
        ),
        outcome => outcome,
    }
}

fn feed_attr_param_rest(name: String, value: Value, input: Input) -> Outcome {
    let input = skip_while(input, is_whitespace);
    if input.head() == Some(')') {
        Outcome::Done(Parsed::Field(Field::Attr(name, value)), input.tail())
    } else if !input.is_empty() {
        fail_expected("')'", input)
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::AttrParamRest { name, value }, input)
    }
}

// Block item chain

fn feed_block_item(builder: Option<Builder>, input: Input) -> Outcome {
    if let Some(c) = input.head() {
        match c {
            '@' => Outcome::Cont(
                Parser::BlockItemField {
                    inner: Box::new(Parser::Attr),
                    builder,
                },
                input,
            ),
            '{' => Outcome::Cont(
                Parser::BlockItemInner {
                    inner: Box::new(Parser::record(
                        builder.unwrap_or_else(Builder::record),
                    )),
                },
                input,
            ),
            '[' => Outcome::Cont(
                Parser::BlockItemInner {
                    inner: Box::new(Parser::markup(
                        builder.unwrap_or_else(Builder::record),
                    )),
                },
                input,
            ),
            '"' => Outcome::Cont(
                Parser::BlockItemValue {
                    inner: Box::new(Parser::StringLit),
                    builder,
                },
                input,
            ),
            '%' => Outcome::Cont(
                Parser::BlockItemValue {
                    inner: Box::new(Parser::DataLit),
                    builder,
                },
                input,
            ),
            c if is_name_start_char(c) => Outcome::Cont(
                Parser::BlockItemValue {
                    inner: Box::new(Parser::Ident),
                    builder,
                },
                input,
            ),
            c if c == '-' || c.is_ascii_digit() => Outcome::Cont(
                Parser::BlockItemValue {
                    inner: Box::new(Parser::Number),
                    builder,
                },
                input,
            ),
            _ => {
                let value = match builder {
                    Some(builder) => builder.into_value(),
                    None => Value::Extant,
                };
                Outcome::Done(Parsed::Value(value), input)
            }
        }
    } else if input.is_done() {
        let value = match builder {
            Some(builder) => builder.into_value(),
            None => Value::Extant,
        };
        Outcome::Done(Parsed::Value(value), input)
    } else {
        Outcome::Cont(Parser::BlockItem { builder }, input)
    }
}

fn feed_block_item_field<'a>(
    inner: Parser,
    builder: Option<Builder>,
    input: Input<'a>,
) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::BlockItemField {
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            let mut builder = builder.unwrap_or_else(Builder::value);
            builder.push_field(parsed.into_field());
            Outcome::Cont(Parser::BlockItemFieldRest { builder }, remaining)
        }
        outcome => outcome,
    }
}

fn feed_block_item_field_rest(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if !input.is_empty() {
        Outcome::Cont(
            Parser::BlockItem {
                builder: Some(builder),
            },
            input,
        )
    } else if input.is_done() {
        Outcome::Done(Parsed::Value(builder.into_value()), input)
    } else {
        Outcome::Cont(Parser::BlockItemFieldRest { builder }, input)
    }
}

fn feed_block_item_value<'a>(
    inner: Parser,
    builder: Option<Builder>,
    input: Input<'a>,
) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::BlockItemValue {
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            let mut builder = builder.unwrap_or_else(Builder::value);
            builder.push_value(parsed.into_value());
            if remaining.is_done() {
                Outcome::Done(Parsed::Value(builder.into_value()), remaining)
            } else {
                Outcome::Cont(Parser::BlockItemRest { builder }, remaining)
            }
        }
        outcome => outcome,
    }
}

fn feed_block_item_inner<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::BlockItemInner {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => Outcome::Cont(
            Parser::BlockItemRest {
                builder: parsed.into_builder(),
            },
            remaining,
        ),
        outcome => outcome,
    }
}

fn feed_block_item_rest(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if input.head() == Some('@') {
        Outcome::Cont(
            Parser::BlockItem {
                builder: Some(builder),
            },
            input,
        )
    } else if !input.is_empty() || input.is_done() {
        Outcome::Done(Parsed::Value(builder.into_value()), input)
    } else {
        Outcome::Cont(Parser::BlockItemRest { builder }, input)
    }
}

// Record container

fn feed_record_start(builder: Builder, input: Input) -> Outcome {
    if input.head() == Some('{') {
        Outcome::Cont(Parser::RecordKey { builder }, input.tail())
    } else if !input.is_empty() {
        fail_expected("'{'", input)
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::RecordStart { builder }, input)
    }
}

fn feed_record_key(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_whitespace);
    if let Some(c) = input.head() {
        if c == '}' {
            Outcome::Done(Parsed::Builder(builder), input.tail())
        } else if is_block_item_start(c) {
            Outcome::Cont(
                Parser::RecordItem {
                    inner: Box::new(Parser::block_item(None)),
                    builder,
                },
                input,
            )
        } else {
            fail_expected("record item", input)
        }
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::RecordKey { builder }, input)
    }
}

fn feed_record_item<'a>(inner: Parser, builder: Builder, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::RecordItem {
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => Outcome::Cont(
            Parser::RecordItemRest {
                key: parsed.into_value(),
                builder,
            },
            remaining,
        ),
        outcome => outcome,
    }
}

fn feed_record_item_rest(key: Value, mut builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if input.head() == Some(':') {
        Outcome::Cont(Parser::RecordItemThenValue { key, builder }, input.tail())
    } else if !input.is_empty() {
        builder.push_value(key);
        Outcome::Cont(Parser::RecordSeparator { builder }, input)
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::RecordItemRest { key, builder }, input)
    }
}

fn feed_record_item_then_value(key: Value, builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    if !input.is_empty() {
        Outcome::Cont(
            Parser::RecordItemValue {
                key,
                inner: Box::new(Parser::block_item(None)),
                builder,
            },
            input,
        )
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::RecordItemThenValue { key, builder }, input)
    }
}

fn feed_record_item_value<'a>(
    key: Value,
    inner: Parser,
    mut builder: Builder,
    input: Input<'a>,
) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::RecordItemValue {
                key,
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            builder.push_slot(key, parsed.into_value());
            Outcome::Cont(Parser::RecordSeparator { builder }, remaining)
        }
        outcome => outcome,
    }
}

fn feed_record_separator(builder: Builder, input: Input) -> Outcome {
    let input = skip_while(input, is_space);
    match input.head() {
        Some('}') => Outcome::Done(Parsed::Builder(builder), input.tail()),
        Some(c) if c == ',' || c == ';' || is_newline(c) => {
            Outcome::Cont(Parser::RecordKey { builder }, input.tail())
        }
        Some(_) => fail_expected("'}', ',', ';', or newline", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::RecordSeparator { builder }, input),
    }
}

// Markup container

fn feed_markup_start(builder: Builder, input: Input) -> Outcome {
    if input.head() == Some('[') {
        Outcome::Cont(
            Parser::MarkupText {
                text: String::new(),
                builder,
            },
            input.tail(),
        )
    } else if !input.is_empty() {
        fail_expected("'['", input)
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::MarkupStart { builder }, input)
    }
}

fn feed_markup_text(mut text: String, mut builder: Builder, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if !matches!(c, '@' | '[' | '\\' | ']' | '{' | '}') {
            text.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    match input.head() {
        Some(']') => {
            if !text.is_empty() {
                builder.push_value(Value::Text(text));
            }
            Outcome::Done(Parsed::Builder(builder), input.tail())
        }
        Some('@') => {
            if !text.is_empty() {
                builder.push_value(Value::Text(text));
            }
            Outcome::Cont(
                Parser::MarkupValue {
                    inner: Box::new(Parser::InlineItemField {
                        inner: Box::new(Parser::Attr),
                    }),
                    builder,
                },
                input,
            )
        }
        Some('{') => {
            if !text.is_empty() {
                builder.push_value(Value::Text(text));
            }
            Outcome::Cont(
                Parser::MarkupInner {
                    inner: Box::new(Parser::record(builder)),
                },
                input,
            )
        }
        Some('[') => {
            if !text.is_empty() {
                builder.push_value(Value::Text(text));
            }
            Outcome::Cont(
                Parser::MarkupInner {
                    inner: Box::new(Parser::markup(builder)),
                },
                input,
            )
        }
        Some('\\') => Outcome::Cont(Parser::MarkupEscape { text, builder }, input.tail()),
        Some(_) => fail_expected("markup text", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::MarkupText { text, builder }, input),
    }
}

fn feed_markup_value<'a>(inner: Parser, mut builder: Builder, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::MarkupValue {
                inner: Box::new(next),
                builder,
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            builder.push_value(parsed.into_value());
            Outcome::Cont(
                Parser::MarkupText {
                    text: String::new(),
                    builder,
                },
                remaining,
            )
        }
        outcome => outcome,
    }
}

fn feed_markup_inner<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::MarkupInner {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => Outcome::Cont(
            Parser::MarkupText {
                text: String::new(),
                builder: parsed.into_builder(),
            },
            remaining,
        ),
        outcome => outcome,
    }
}

fn feed_markup_escape(mut text: String, builder: Builder, input: Input) -> Outcome {
    if let Some(c) = input.head() {
        match c {
            '"' | '/' | '@' | '[' | '\\' | ']' | '{' | '}' => text.push(c),
            'b' => text.push('\u{8}'),
            'f' => text.push('\u{C}'),
            'n' => text.push('\n'),
            'r' => text.push('\r'),
            't' => text.push('\t'),
            _ => return fail_expected("escape character", input),
        }
        Outcome::Cont(Parser::MarkupText { text, builder }, input.tail())
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::MarkupEscape { text, builder }, input)
    }
}

// Inline item (attribute embedded in markup)

fn feed_inline_item_field<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::InlineItemField {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => {
            let mut builder = Builder::record();
            builder.push_field(parsed.into_field());
            Outcome::Cont(Parser::InlineItemRest { builder }, remaining)
        }
        outcome => outcome,
    }
}

fn feed_inline_item_rest(builder: Builder, input: Input) -> Outcome {
    match input.head() {
        Some('{') => Outcome::Cont(
            Parser::InlineItemInner {
                inner: Box::new(Parser::record(builder)),
            },
            input,
        ),
        Some('[') => Outcome::Cont(
            Parser::InlineItemInner {
                inner: Box::new(Parser::markup(builder)),
            },
            input,
        ),
        Some(_) => Outcome::Done(Parsed::Value(builder.into_value()), input),
        None if input.is_done() => Outcome::Done(Parsed::Value(builder.into_value()), input),
        None => Outcome::Cont(Parser::InlineItemRest { builder }, input),
    }
}

fn feed_inline_item_inner<'a>(inner: Parser, input: Input<'a>) -> Outcome<'a> {
    match inner.run(input) {
        Outcome::Cont(next, remaining) => Outcome::Cont(
            Parser::InlineItemInner {
                inner: Box::new(next),
            },
            remaining,
        ),
        Outcome::Done(parsed, remaining) => Outcome::Done(
            Parsed::Value(parsed.into_builder().into_value()),
            remaining,
        ),
        outcome => outcome,
    }
}

// Identifier token

fn feed_ident(input: Input) -> Outcome {
    match input.head() {
        Some(c) if is_name_start_char(c) => Outcome::Cont(
            Parser::IdentRest {
                ident: String::from(c),
            },
            input.tail(),
        ),
        Some(_) => fail_expected("identifier", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::Ident, input),
    }
}

fn feed_ident_rest(mut ident: String, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if is_name_char(c) {
            ident.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    if !input.is_empty() || input.is_done() {
        Outcome::Done(Parsed::Ident(ident), input)
    } else {
        Outcome::Cont(Parser::IdentRest { ident }, input)
    }
}

// String token

fn feed_string(input: Input) -> Outcome {
    match input.head() {
        Some('"') => Outcome::Cont(
            Parser::StringRest {
                text: String::new(),
            },
            input.tail(),
        ),
        Some(_) => fail_expected("string", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::StringLit, input),
    }
}

fn feed_string_rest(mut text: String, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if c != '"' && c != '\\' {
            text.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    match input.head() {
        Some('"') => Outcome::Done(Parsed::Text(text), input.tail()),
        Some(_) => Outcome::Cont(Parser::StringEscape { text }, input.tail()),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::StringRest { text }, input),
    }
}

fn feed_string_escape(mut text: String, input: Input) -> Outcome {
    if let Some(c) = input.head() {
        match c {
            '"' | '/' | '@' | '[' | '\\' | ']' | '{' | '}' => text.push(c),
            'b' => text.push('\u{8}'),
            'f' => text.push('\u{C}'),
            'n' => text.push('\n'),
            'r' => text.push('\r'),
            't' => text.push('\t'),
            _ => return fail_expected("escape character", input),
        }
        Outcome::Cont(Parser::StringRest { text }, input.tail())
    } else if input.is_done() {
        fail_eof(input)
    } else {
        Outcome::Cont(Parser::StringEscape { text }, input)
    }
}

// Number token

fn feed_number(input: Input) -> Outcome {
    match input.head() {
        Some('-') => Outcome::Cont(
            Parser::NumberIntegral {
                literal: String::from('-'),
            },
            input.tail(),
        ),
        Some(_) => Outcome::Cont(
            Parser::NumberIntegral {
                literal: String::new(),
            },
            input,
        ),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::Number, input),
    }
}

fn feed_number_integral(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some('0') => {
            literal.push('0');
            Outcome::Cont(Parser::NumberRest { literal }, input.tail())
        }
        Some(c) if ('1'..='9').contains(&c) => {
            literal.push(c);
            Outcome::Cont(Parser::NumberIntegralRest { literal }, input.tail())
        }
        Some(_) => fail_expected("digit", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::NumberIntegral { literal }, input),
    }
}

fn feed_number_integral_rest(mut literal: String, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if c.is_ascii_digit() {
            literal.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    if !input.is_empty() {
        Outcome::Cont(Parser::NumberRest { literal }, input)
    } else if input.is_done() {
        Outcome::Done(Parsed::Number(integral_value(&literal)), input)
    } else {
        Outcome::Cont(Parser::NumberIntegralRest { literal }, input)
    }
}

fn feed_number_rest(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some('.') => {
            literal.push('.');
            Outcome::Cont(Parser::NumberFractional { literal }, input.tail())
        }
        Some(c) if c == 'E' || c == 'e' => {
            literal.push(c);
            Outcome::Cont(Parser::NumberExponential { literal }, input.tail())
        }
        Some(_) => Outcome::Done(Parsed::Number(integral_value(&literal)), input),
        None if input.is_done() => Outcome::Done(Parsed::Number(integral_value(&literal)), input),
        None => Outcome::Cont(Parser::NumberRest { literal }, input),
    }
}

fn feed_number_fractional(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some(c) if c.is_ascii_digit() => {
            literal.push(c);
            Outcome::Cont(Parser::NumberFractionalRest { literal }, input.tail())
        }
        Some(_) => fail_expected("digit", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::NumberFractional { literal }, input),
    }
}

fn feed_number_fractional_rest(mut literal: String, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if c.is_ascii_digit() {
            literal.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    if !input.is_empty() {
        Outcome::Cont(Parser::NumberFractionalExponent { literal }, input)
    } else if input.is_done() {
        Outcome::Done(Parsed::Number(float_value(&literal)), input)
    } else {
        Outcome::Cont(Parser::NumberFractionalRest { literal }, input)
    }
}

fn feed_number_fractional_exponent(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some(c) if c == 'E' || c == 'e' => {
            literal.push(c);
            Outcome::Cont(Parser::NumberExponential { literal }, input.tail())
        }
        Some(_) => Outcome::Done(Parsed::Number(float_value(&literal)), input),
        None if input.is_done() => Outcome::Done(Parsed::Number(float_value(&literal)), input),
        None => Outcome::Cont(Parser::NumberFractionalExponent { literal }, input),
    }
}

fn feed_number_exponential(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some(c) => {
            let input = if c == '+' || c == '-' {
                literal.push(c);
                input.tail()
            } else {
                input
            };
            Outcome::Cont(Parser::NumberExponentialPart { literal }, input)
        }
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::NumberExponential { literal }, input),
    }
}

fn feed_number_exponential_part(mut literal: String, input: Input) -> Outcome {
    match input.head() {
        Some(c) if c.is_ascii_digit() => {
            literal.push(c);
            Outcome::Cont(Parser::NumberExponentialRest { literal }, input.tail())
        }
        Some(_) => fail_expected("digit", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::NumberExponentialPart { literal }, input),
    }
}

fn feed_number_exponential_rest(mut literal: String, mut input: Input) -> Outcome {
    while let Some(c) = input.head() {
        if c.is_ascii_digit() {
            literal.push(c);
            input = input.tail();
        } else {
            break;
        }
    }
    if !input.is_empty() || input.is_done() {
        Outcome::Done(Parsed::Number(float_value(&literal)), input)
    } else {
        Outcome::Cont(Parser::NumberExponentialRest { literal }, input)
    }
}

/// Converts a validated integral literal, falling back through `f64` when
/// the digits overflow `i64`.
fn integral_value(literal: &str) -> f64 {
    match literal.parse::<i64>() {
        Ok(n) => n as f64,
        Err(_) => float_value(literal),
    }
}

fn float_value(literal: &str) -> f64 {
    // The grammar admits only well-formed numeric literals here.
    literal.parse().expect("validated numeric literal")
}

// Data token

fn feed_data(input: Input) -> Outcome {
    match input.head() {
        Some('%') => Outcome::Cont(
            Parser::DataRest {
                decoder: Base64Decoder::new(),
                state: 0,
            },
            input.tail(),
        ),
        Some(_) => fail_expected("data", input),
        None if input.is_done() => fail_eof(input),
        None => Outcome::Cont(Parser::DataLit, input),
    }
}

fn feed_data_rest(mut decoder: Base64Decoder, mut state: u8, mut input: Input) -> Outcome {
    // state 4 means the first `=` of a two-`=` padding was already consumed;
    // a resumed parse must not treat further digits as a fresh quantum.
    if state != 4 {
        while let Some(c) = input.head() {
            if is_base64_char(c) {
                decoder.push(c);
                input = input.tail();
                state = (state + 1) % 4;
            } else {
                break;
            }
        }
    }
    if state == 2 {
        if let Some(c) = input.head() {
            if c == '=' {
                decoder.push(c);
                input = input.tail();
                state = 4;
            } else {
                return fail_expected("base64 digit", input);
            }
        }
    }
    if state == 3 {
        if let Some(c) = input.head() {
            if c == '=' {
                decoder.push(c);
                return Outcome::Done(Parsed::Data(decoder.into_data()), input.tail());
            } else {
                return fail_expected("base64 digit", input);
            }
        }
    }
    if state == 4 {
        if let Some(c) = input.head() {
            if c == '=' {
                decoder.push(c);
                return Outcome::Done(Parsed::Data(decoder.into_data()), input.tail());
            } else {
                return fail_expected("'='", input);
            }
        }
    }
    if !input.is_empty() {
        if state == 0 {
            Outcome::Done(Parsed::Data(decoder.into_data()), input)
        } else {
            fail_expected("base64 digit", input)
        }
    } else if input.is_done() {
        if state == 0 {
            Outcome::Done(Parsed::Data(decoder.into_data()), input)
        } else {
            fail_eof(input)
        }
    } else {
        Outcome::Cont(Parser::DataRest { decoder, state }, input)
    }
}

// Character classes

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_whitespace(c: char) -> bool {
    is_space(c) || is_newline(c)
}

fn is_block_item_start(c: char) -> bool {
    c == '@'
        || c == '{'
        || c == '['
        || c == '"'
        || c == '-'
        || c == '%'
        || c.is_ascii_digit()
        || is_name_start_char(c)
}

pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub(crate) fn is_name_char(c: char) -> bool {
    matches!(c,
        '-'
        | '0'..='9'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// `true` when the whole string matches the identifier production, so it can
/// print unquoted.
pub(crate) fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}
