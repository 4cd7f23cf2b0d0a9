//! RECON serialization.
//!
//! The serializer renders a value back to RECON text using the same
//! block/markup/attribute syntax rules the parser accepts. Records are the
//! interesting case: a single left-to-right pass over the items tracks which
//! grouping context is open (`{…}` braces or `[…]` markup brackets), with
//! one item of lookahead deciding when a context opens or closes:
//!
//! - an attribute closes whatever is open and prints as `@name(params)`
//! - text immediately followed by a bare non-text value opens markup, which
//!   is how `[A: {42}.]`-style output comes back
//! - a record with one leading attribute and no other is inlined into
//!   markup (`[Hello, @em[world]!]`)
//! - bare scalars print unattended where the grammar allows it, with a
//!   separating space when the previous token would otherwise glue on
//! - everything else lands in a comma-joined brace group
//!
//! [`Value::to_recon`] is the full form; [`Value::to_recon_block`] flattens
//! the top level when the record is block-safe (contains no attribute), so
//! `{from: me, to: you}` prints as `from:me,to:you`.
//!
//! ## Examples
//!
//! ```rust
//! use recon::{Item, Record, Value};
//!
//! let value = Value::from(vec![
//!     Item::from("Hello, "),
//!     Item::from(vec![Item::attr("em"), Item::from("world")]),
//!     Item::from("!"),
//! ]);
//! assert_eq!(value.to_recon(), "[Hello, @em[world]!]");
//! ```

use std::fmt;

use crate::parser::{is_ident, is_name_char};
use crate::value::{Field, Item, Record, Value};

impl Value {
    /// Renders the value as RECON text, full form.
    #[must_use]
    pub fn to_recon(&self) -> String {
        let mut out = String::new();
        write_value(self, &mut out);
        out
    }

    /// Renders the value as RECON text, flattening a block-safe top-level
    /// record to a braceless item list.
    #[must_use]
    pub fn to_recon_block(&self) -> String {
        match self {
            Value::Record(record) if !record.is_empty() && record.is_block_safe() => {
                let mut out = String::new();
                write_block_items(record, &mut out);
                out
            }
            _ => self.to_recon(),
        }
    }
}

impl Item {
    /// Renders the item as RECON text.
    #[must_use]
    pub fn to_recon(&self) -> String {
        let mut out = String::new();
        write_item(self, &mut out);
        out
    }

    /// Renders the item as RECON text, flattening a block-safe record value.
    #[must_use]
    pub fn to_recon_block(&self) -> String {
        match self {
            Item::Field(_) => self.to_recon(),
            Item::Value(value) => value.to_recon_block(),
        }
    }
}

impl Record {
    /// Renders the record as RECON text, full form.
    #[must_use]
    pub fn to_recon(&self) -> String {
        let mut out = String::new();
        write_record(self, &mut out, false);
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_recon())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_recon())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_recon())
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Record(record) => write_record(record, out, false),
        Value::Data(data) => {
            out.push('%');
            out.push_str(&data.to_base64());
        }
        Value::Text(text) => write_text(text, out),
        Value::Number(number) => write_number(*number, out),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Extant | Value::Absent => {}
    }
}

/// The generic item form: `@attr(…)`, `key:value`, or the bare value.
fn write_item(item: &Item, out: &mut String) {
    match item {
        Item::Field(Field::Attr(name, value)) => write_attr(name, value, out),
        Item::Field(Field::Slot(key, value)) => {
            write_value(key, out);
            out.push(':');
            if !value.is_extant() {
                write_value(value, out);
            }
        }
        Item::Value(value) => write_value(value, out),
    }
}

fn write_attr(name: &str, value: &Value, out: &mut String) {
    out.push('@');
    out.push_str(name);
    if !value.is_extant() {
        out.push('(');
        match value {
            Value::Record(record) if !record.is_empty() && record.is_block_safe() => {
                write_block_items(record, out);
            }
            value => write_value(value, out),
        }
        out.push(')');
    }
}

fn write_block_items(record: &Record, out: &mut String) {
    let mut first = true;
    for item in record {
        if first {
            first = false;
        } else {
            out.push(',');
        }
        write_item(item, out);
    }
}

fn write_record(record: &Record, out: &mut String, in_markup: bool) {
    if record.is_empty() {
        out.push_str("{}");
        return;
    }
    let items = record.items();
    let n = items.len();
    let mut in_braces = false;
    let mut in_brackets = false;
    let mut first = true;
    let mut i = 0;
    while i < n {
        let item = &items[i];
        i += 1;
        if item.is_attr() {
            if in_braces {
                out.push('}');
                in_braces = false;
            }
            if in_brackets {
                out.push(']');
                in_brackets = false;
            }
        }
        if let Item::Field(Field::Attr(name, value)) = item {
            write_attr(name, value, out);
            first = false;
        } else if in_brackets && item.is_text() {
            if in_braces {
                out.push('}');
                in_braces = false;
            }
            write_markup_text(item.as_text().unwrap_or_default(), out);
        } else if in_braces {
            if first {
                first = false;
            } else {
                out.push(',');
            }
            write_item(item, out);
        } else if in_brackets {
            match item.as_record() {
                Some(embedded) if embedded.is_markup_safe() => {
                    write_record(embedded, out, true);
                    let stays_in_markup = i < n
                        && (items[i].is_text()
                            || items[i]
                                .as_record()
                                .map_or(false, Record::is_markup_safe));
                    if stays_in_markup {
                        // A bare attr would glue onto following name
                        // characters (or an opening paren); an empty body
                        // keeps the tokens apart.
                        if out.ends_with(is_name_char) && glues_to_ident(&items[i]) {
                            out.push_str("{}");
                        }
                    } else if i < n && !items[i].is_attr() {
                        out.push('{');
                        in_braces = true;
                        first = true;
                    } else {
                        out.push(']');
                        in_brackets = false;
                    }
                }
                _ => {
                    out.push('{');
                    write_item(item, out);
                    in_braces = true;
                    first = false;
                }
            }
        } else if item.is_text()
            && (i < n && !items[i].is_field() && !items[i].is_text() || in_markup && i == n)
        {
            out.push('[');
            write_markup_text(item.as_text().unwrap_or_default(), out);
            in_brackets = true;
        } else if !in_markup
            && item.is_value()
            && !item.is_record()
            && (!first && i == n || i < n && items[i].is_attr())
        {
            if !first && glues_to_attr(item.value()) {
                out.push(' ');
            }
            write_value(item.value(), out);
        } else {
            out.push('{');
            write_item(item, out);
            in_braces = true;
            first = false;
        }
    }
    if in_braces {
        out.push('}');
    }
    if in_brackets {
        out.push(']');
    }
}

/// `true` for bare forms that would fuse with a preceding attribute token.
fn glues_to_attr(value: &Value) -> bool {
    match value {
        Value::Text(text) => is_ident(text),
        Value::Number(_) | Value::Bool(_) => true,
        _ => false,
    }
}

/// `true` when a markup text item starts with a character that would extend
/// a preceding attribute token.
fn glues_to_ident(item: &Item) -> bool {
    item.as_text()
        .and_then(|text| text.chars().next())
        .map_or(false, |c| is_name_char(c) || c == '(')
}

fn write_text(text: &str, out: &mut String) {
    // `true`/`false` print quoted so they never read back as booleans.
    if is_ident(text) && text != "true" && text != "false" {
        out.push_str(text);
    } else {
        write_string(text, out);
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\u{8}' => out.push_str("\\b"),
            '\u{C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn write_markup_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '@' | '[' | '\\' | ']' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\u{8}' => out.push_str("\\b"),
            '\u{C}' => out.push_str("\\f"),
            _ => out.push(c),
        }
    }
}

fn write_number(number: f64, out: &mut String) {
    if number.is_finite()
        && number.fract() == 0.0
        && number >= i64::MIN as f64
        && number < i64::MAX as f64
    {
        out.push_str(&(number as i64).to_string());
    } else {
        out.push_str(&number.to_string());
    }
}
