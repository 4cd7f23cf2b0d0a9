//! Builders that accumulate parsed items into a value.
//!
//! Two strategies exist, and which one a grammar rule uses is what gives
//! RECON its scalar/record duality:
//!
//! - [`RecordBuilder`] always produces a record. Explicit `{…}` and `[…]`
//!   containers use it, so `{1}` stays a one-item record.
//! - [`ValueBuilder`] holds a single bare value speculatively and only
//!   promotes to a record when a second item (or any field) arrives. Blocks
//!   and attribute parameter lists use it, so `1` parses to a number while
//!   `1,2` parses to a record, through the same rules.
//!
//! Parser states own their builder and hand it back through their outcome,
//! so a suspended parse carries its partial structure with it.

use crate::value::{Field, Item, Record, Value};

/// Either accumulation strategy, as used by the parser.
#[derive(Clone, Debug)]
pub enum Builder {
    Record(RecordBuilder),
    Value(ValueBuilder),
}

impl Builder {
    /// A builder that always yields a record.
    #[must_use]
    pub fn record() -> Builder {
        Builder::Record(RecordBuilder::new())
    }

    /// A builder that yields a bare scalar until a second item arrives.
    #[must_use]
    pub fn value() -> Builder {
        Builder::Value(ValueBuilder::new())
    }

    pub fn push_item(&mut self, item: Item) {
        match self {
            Builder::Record(builder) => builder.push_item(item),
            Builder::Value(builder) => builder.push_item(item),
        }
    }

    pub fn push_field(&mut self, field: Field) {
        self.push_item(Item::Field(field));
    }

    pub fn push_value(&mut self, value: Value) {
        self.push_item(Item::Value(value));
    }

    pub fn push_attr(&mut self, name: impl Into<String>, value: Value) {
        self.push_field(Field::Attr(name.into(), value));
    }

    pub fn push_slot(&mut self, key: Value, value: Value) {
        self.push_field(Field::Slot(key, value));
    }

    /// The value accumulated so far.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Builder::Record(builder) => builder.into_value(),
            Builder::Value(builder) => builder.into_value(),
        }
    }
}

/// Accumulates every item into a record.
#[derive(Clone, Debug, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    #[must_use]
    pub fn new() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn push_item(&mut self, item: Item) {
        self.record.push(item);
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Record(self.record)
    }
}

/// Holds at most one bare value; promotes to a record on the second append.
#[derive(Clone, Debug, Default)]
pub struct ValueBuilder {
    record: Option<Record>,
    value: Option<Value>,
}

impl ValueBuilder {
    #[must_use]
    pub fn new() -> ValueBuilder {
        ValueBuilder::default()
    }

    pub fn push_item(&mut self, item: Item) {
        if let Some(record) = &mut self.record {
            record.push(item);
            return;
        }
        match item {
            Item::Value(value) if self.value.is_none() => self.value = Some(value),
            item => {
                let mut record = Record::new();
                if let Some(value) = self.value.take() {
                    record.push(Item::Value(value));
                }
                record.push(item);
                self.record = Some(record);
            }
        }
    }

    pub fn push_field(&mut self, field: Field) {
        self.push_item(Item::Field(field));
    }

    /// The held scalar if only one value was ever appended, the record if
    /// promotion happened, or `Absent` if nothing arrived at all.
    #[must_use]
    pub fn into_value(self) -> Value {
        if let Some(value) = self.value {
            value
        } else if let Some(record) = self.record {
            Value::Record(record)
        } else {
            Value::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder_keeps_single_values_wrapped() {
        let mut builder = RecordBuilder::new();
        builder.push_item(Item::from(1));
        assert_eq!(
            builder.into_value(),
            Value::from(vec![Item::from(1)])
        );
    }

    #[test]
    fn test_value_builder_yields_bare_scalar() {
        let mut builder = ValueBuilder::new();
        builder.push_item(Item::from(1));
        assert_eq!(builder.into_value(), Value::Number(1.0));
    }

    #[test]
    fn test_value_builder_promotes_on_second_value() {
        let mut builder = ValueBuilder::new();
        builder.push_item(Item::from(1));
        builder.push_item(Item::from(2));
        assert_eq!(
            builder.into_value(),
            Value::from(vec![Item::from(1), Item::from(2)])
        );
    }

    #[test]
    fn test_value_builder_promotes_on_field() {
        let mut builder = ValueBuilder::new();
        builder.push_field(Field::Attr("a".to_string(), Value::Extant));
        assert_eq!(
            builder.into_value(),
            Value::from(vec![Item::attr("a")])
        );
    }

    #[test]
    fn test_value_builder_empty_is_absent() {
        assert_eq!(ValueBuilder::new().into_value(), Value::Absent);
    }

    #[test]
    fn test_held_value_becomes_first_item() {
        let mut builder = Builder::value();
        builder.push_value(Value::from("a"));
        builder.push_attr("b", Value::Extant);
        assert_eq!(
            builder.into_value(),
            Value::from(vec![Item::from("a"), Item::attr("b")])
        );
    }
}
