//! The RECON value model.
//!
//! This module provides the recursive data model every other part of the
//! crate works in terms of:
//!
//! - [`Value`]: a record, text, data, number, boolean, or one of the two
//!   presence markers ([`Extant`](Value::Extant) for "present but valueless",
//!   [`Absent`](Value::Absent) for "no such value")
//! - [`Field`]: a named attribute (`@name(value)`) or a keyed slot
//!   (`key: value`)
//! - [`Item`]: one element of a record, either a field or a bare value
//! - [`Record`]: an ordered, duplicate-friendly sequence of items
//!
//! Values are plain structural data: no back-references, no cycles, immutable
//! once built. Records keep an optional key index as a lookup cache; it never
//! participates in equality or hashing, which are defined purely over the
//! item sequence.
//!
//! ## Examples
//!
//! ```rust
//! use recon::{Item, Record, Value};
//!
//! let record = Record::from(vec![
//!     Item::attr("event"),
//!     Item::slot("from", "me"),
//!     Item::from(42),
//! ]);
//! let value = Value::Record(record);
//!
//! assert_eq!(value.get("from"), &Value::from("me"));
//! assert_eq!(value.get_item(2), &Item::from(42));
//! assert!(value.get("missing").is_absent());
//! ```

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::data::Data;
use crate::hash;

static ABSENT_VALUE: Value = Value::Absent;
static ABSENT_ITEM: Item = Item::Value(Value::Absent);

/// Any RECON value.
///
/// Numbers are `f64` throughout; whether a number prints as an integer or a
/// decimal literal is a serialization decision, not a model distinction.
/// Booleans have their own variant, so `Value::from("true")` (text) and
/// `Value::Bool(true)` never compare equal and never serialize alike.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    Record(Record),
    Data(Data),
    Text(String),
    Number(f64),
    Bool(bool),
    /// Present, but with no value — e.g. the value of `@attr` or of `key:`.
    Extant,
    /// No such value — the result of a failed lookup, and of parsing empty
    /// input.
    #[default]
    Absent,
}

impl Value {
    /// Parses a RECON document, like the crate-level [`parse`](crate::parse).
    ///
    /// # Errors
    ///
    /// Returns the first syntax error; no partial value is produced.
    pub fn parse_recon(text: &str) -> crate::Result<Value> {
        crate::parse(text)
    }

    /// `true` for everything but `Absent`.
    #[inline]
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !matches!(self, Value::Absent)
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self, Value::Data(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_extant(&self) -> bool {
        matches!(self, Value::Extant)
    }

    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// If the value is a record, a reference to it.
    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// If the value is text, the string slice.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// If the value is data, a reference to it.
    #[inline]
    #[must_use]
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    /// If the value is a number, its `f64`.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The first item of a record value, or an absent item.
    #[must_use]
    pub fn first(&self) -> &Item {
        match self {
            Value::Record(record) => record.first().unwrap_or(&ABSENT_ITEM),
            _ => &ABSENT_ITEM,
        }
    }

    /// The last item of a record value, or an absent item.
    #[must_use]
    pub fn last(&self) -> &Item {
        match self {
            Value::Record(record) => record.last().unwrap_or(&ABSENT_ITEM),
            _ => &ABSENT_ITEM,
        }
    }

    /// The item at `index` of a record value, or an absent item.
    #[must_use]
    pub fn get_item(&self, index: usize) -> &Item {
        match self {
            Value::Record(record) => record.get(index).unwrap_or(&ABSENT_ITEM),
            _ => &ABSENT_ITEM,
        }
    }

    /// Looks up a field value by key in a record value; `Absent` on a miss or
    /// on a non-record.
    #[must_use]
    pub fn get_value(&self, key: &Value) -> &Value {
        match self {
            Value::Record(record) => record.get_key(key).unwrap_or(&ABSENT_VALUE),
            _ => &ABSENT_VALUE,
        }
    }

    /// Looks up a field value by text key.
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        self.get_value(&Value::Text(key.to_string()))
    }

    /// The model hash of this value.
    ///
    /// Structurally equal values hash equal; a record's lookup index never
    /// contributes.
    #[must_use]
    pub fn hash_code(&self) -> u32 {
        const TEXT_SEED: u32 = 0x6c94_ee17;
        const NUMBER_SEED: u32 = 0x3d1c_e043;
        const BOOL_SEED: u32 = 0x9c3a_77d1;
        match self {
            Value::Record(record) => record.hash_code(),
            Value::Data(data) => data.hash_code(),
            Value::Text(text) => text_hash(TEXT_SEED, text),
            Value::Number(number) => {
                // Fold -0.0 into 0.0 so equal numbers hash equal.
                let bits = if *number == 0.0 { 0 } else { number.to_bits() };
                hash::hash2(NUMBER_SEED, bits as u32, (bits >> 32) as u32)
            }
            Value::Bool(value) => hash::finish(hash::mix(BOOL_SEED, u32::from(*value))),
            Value::Extant => 0x8e02_616a,
            Value::Absent => 0xd35f_02e5,
        }
    }
}

pub(crate) fn text_hash(seed: u32, text: &str) -> u32 {
    let mut h = seed;
    for byte in text.bytes() {
        h = hash::mix(h, u32::from(byte));
    }
    hash::finish(h)
}

// Parsed input never contains NaN, and programmatic NaN would break lookup
// reflexivity just as it does for f64 keys anywhere else.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Data> for Value {
    fn from(value: Data) -> Self {
        Value::Data(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<Item>> for Value {
    fn from(items: Vec<Item>) -> Self {
        Value::Record(Record::from(items))
    }
}

/// A named attribute or a keyed slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// `@name(value)`; the value is `Extant` when the parameter list is
    /// omitted or empty.
    Attr(String, Value),
    /// `key: value`; the value is `Extant` when omitted.
    Slot(Value, Value),
}

impl Field {
    #[inline]
    #[must_use]
    pub const fn is_attr(&self) -> bool {
        matches!(self, Field::Attr(_, _))
    }

    #[inline]
    #[must_use]
    pub const fn is_slot(&self) -> bool {
        matches!(self, Field::Slot(_, _))
    }

    /// The field's key; an attribute's key is its name as text.
    #[must_use]
    pub fn key(&self) -> Value {
        match self {
            Field::Attr(name, _) => Value::Text(name.clone()),
            Field::Slot(key, _) => key.clone(),
        }
    }

    /// The field's value.
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Field::Attr(_, value) => value,
            Field::Slot(_, value) => value,
        }
    }

    #[must_use]
    pub fn hash_code(&self) -> u32 {
        const ATTR_SEED: u32 = 0x8b9c_f328;
        const SLOT_SEED: u32 = 0x543c_0c9b;
        match self {
            Field::Attr(name, value) => {
                hash::hash2(ATTR_SEED, text_hash(0, name), value.hash_code())
            }
            Field::Slot(key, value) => {
                hash::hash2(SLOT_SEED, key.hash_code(), value.hash_code())
            }
        }
    }
}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

/// One element of a record: a field or a bare value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Field(Field),
    Value(Value),
}

impl Item {
    /// An extant-valued attribute: `@name`.
    pub fn attr(name: impl Into<String>) -> Item {
        Item::Field(Field::Attr(name.into(), Value::Extant))
    }

    /// An attribute with a parameter value: `@name(value)`.
    pub fn attr_with(name: impl Into<String>, value: impl Into<Value>) -> Item {
        Item::Field(Field::Attr(name.into(), value.into()))
    }

    /// A slot: `key: value`.
    pub fn slot(key: impl Into<Value>, value: impl Into<Value>) -> Item {
        Item::Field(Field::Slot(key.into(), value.into()))
    }

    #[inline]
    #[must_use]
    pub const fn is_field(&self) -> bool {
        matches!(self, Item::Field(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_attr(&self) -> bool {
        matches!(self, Item::Field(Field::Attr(_, _)))
    }

    #[inline]
    #[must_use]
    pub const fn is_slot(&self) -> bool {
        matches!(self, Item::Field(Field::Slot(_, _)))
    }

    #[inline]
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Item::Value(_))
    }

    #[inline]
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Item::Value(Value::Record(_)))
    }

    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Item::Value(Value::Text(_)))
    }

    /// The field key, if this item is a field.
    #[must_use]
    pub fn key(&self) -> Option<Value> {
        match self {
            Item::Field(field) => Some(field.key()),
            Item::Value(_) => None,
        }
    }

    /// The item's value: a field's value, or the bare value itself.
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Item::Field(field) => field.value(),
            Item::Value(value) => value,
        }
    }

    /// The item at `index` of a record item, or an absent item.
    #[must_use]
    pub fn get_item(&self, index: usize) -> &Item {
        match self {
            Item::Value(value) => value.get_item(index),
            Item::Field(_) => &ABSENT_ITEM,
        }
    }

    /// Looks up a field value by text key in a record item.
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Item::Value(value) => value.get(key),
            Item::Field(_) => &ABSENT_VALUE,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Item::Value(value) => value.as_record(),
            Item::Field(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Item::Value(value) => value.as_text(),
            Item::Field(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Item::Value(value) => value.as_number(),
            Item::Field(_) => None,
        }
    }

    #[must_use]
    pub fn hash_code(&self) -> u32 {
        match self {
            Item::Field(field) => field.hash_code(),
            Item::Value(value) => value.hash_code(),
        }
    }
}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl From<Field> for Item {
    fn from(field: Field) -> Self {
        Item::Field(field)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Value(value)
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<i32> for Item {
    fn from(value: i32) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Item::Value(Value::from(value))
    }
}

impl From<Data> for Item {
    fn from(value: Data) -> Self {
        Item::Value(Value::Data(value))
    }
}

impl From<Record> for Item {
    fn from(value: Record) -> Self {
        Item::Value(Value::Record(value))
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Item::Value(Value::from(items))
    }
}

/// An ordered sequence of items, with duplicates permitted.
///
/// Records maintain a secondary key index once the item count crosses a
/// threshold (or once any index has been built); the index is purely a
/// lookup cache. Equality and hashing cover the item sequence alone, so two
/// records with the same items are equal whether or not either has an index.
///
/// Key lookup is last-match-wins: with duplicate keys, the latest field's
/// value is returned, with or without the index.
#[derive(Clone, Debug, Default)]
pub struct Record {
    items: Vec<Item>,
    index: Option<IndexMap<Value, Value>>,
}

const INDEX_THRESHOLD: usize = 8;

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Record::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Item> {
        self.items.last()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Looks up the value of the last field whose key equals `key`.
    #[must_use]
    pub fn get_key(&self, key: &Value) -> Option<&Value> {
        if let Some(index) = &self.index {
            index.get(key)
        } else {
            self.items.iter().rev().find_map(|item| match item {
                Item::Field(field) if &field.key() == key => Some(field.value()),
                _ => None,
            })
        }
    }

    /// Looks up a field value by text key.
    #[must_use]
    pub fn get_text_key(&self, key: &str) -> Option<&Value> {
        self.get_key(&Value::Text(key.to_string()))
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        if let Some(index) = &self.index {
            index.contains_key(key)
        } else {
            self.items.iter().any(|item| match item {
                Item::Field(field) => &field.key() == key,
                Item::Value(_) => false,
            })
        }
    }

    /// Appends one item, keeping the key index current if one exists.
    pub fn push(&mut self, item: Item) {
        let entry = match &item {
            Item::Field(field) => Some((field.key(), field.value().clone())),
            Item::Value(_) => None,
        };
        self.items.push(item);
        if let Some((key, value)) = entry {
            if let Some(index) = &mut self.index {
                index.insert(key, value);
            } else {
                self.reindex();
            }
        }
    }

    /// Appends every item of an iterator.
    pub fn extend_items<I: IntoIterator<Item = Item>>(&mut self, items: I) {
        self.items.extend(items);
        self.reindex();
    }

    fn reindex(&mut self) {
        if self.items.len() > INDEX_THRESHOLD || self.index.is_some() {
            let mut index = IndexMap::new();
            for item in &self.items {
                if let Item::Field(field) = item {
                    // Later duplicates overwrite earlier ones.
                    index.insert(field.key(), field.value().clone());
                }
            }
            self.index = Some(index);
        }
    }

    /// `true` when no item is an attribute, so the record can print as a
    /// braceless top-level block.
    #[must_use]
    pub fn is_block_safe(&self) -> bool {
        !self.items.iter().any(Item::is_attr)
    }

    /// `true` when the record can be inlined into markup: it leads with an
    /// attribute and contains no other one.
    #[must_use]
    pub fn is_markup_safe(&self) -> bool {
        match self.items.split_first() {
            Some((head, rest)) => head.is_attr() && !rest.iter().any(Item::is_attr),
            None => false,
        }
    }

    #[must_use]
    pub fn hash_code(&self) -> u32 {
        let mut h = 0x2494_fd1f;
        for item in &self.items {
            h = hash::mix(h, item.hash_code());
        }
        hash::finish(h)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl From<Vec<Item>> for Record {
    fn from(items: Vec<Item>) -> Self {
        let mut record = Record { items, index: None };
        record.reindex();
        record
    }
}

impl FromIterator<Item> for Record {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Record::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Record {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl std::ops::Index<usize> for Record {
    type Output = Item;

    fn index(&self, index: usize) -> &Item {
        &self.items[index]
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Record(record) => {
                let slots_only = !record.is_empty()
                    && record.iter().all(|item| {
                        matches!(item, Item::Field(Field::Slot(Value::Text(_), _)))
                    });
                if slots_only {
                    let mut map = serializer.serialize_map(Some(record.len()))?;
                    for item in record {
                        if let Item::Field(Field::Slot(Value::Text(key), value)) = item {
                            map.serialize_entry(key, value)?;
                        }
                    }
                    map.end()
                } else {
                    let mut seq = serializer.serialize_seq(Some(record.len()))?;
                    for item in record {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
            }
            Value::Data(data) => serializer.serialize_bytes(data.as_slice()),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Number(number) => {
                if number.fract() == 0.0
                    && *number >= i64::MIN as f64
                    && *number < i64::MAX as f64
                {
                    serializer.serialize_i64(*number as i64)
                } else {
                    serializer.serialize_f64(*number)
                }
            }
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Extant => serializer.serialize_unit(),
            Value::Absent => serializer.serialize_none(),
        }
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Item::Value(value) => value.serialize(serializer),
            Item::Field(Field::Slot(key, value)) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key, value)?;
                map.end()
            }
            Item::Field(Field::Attr(name, value)) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&format!("@{name}"), value)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any RECON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
                Ok(Value::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::Text(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
                Ok(Value::Data(Data::from(value)))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
                Ok(Value::Data(Data::from(value)))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Extant)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Absent)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut record = Record::new();
                while let Some(value) = seq.next_element::<Value>()? {
                    record.push(Item::Value(value));
                }
                Ok(Value::Record(record))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut record = Record::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    // `@name` keys round-trip back into attributes.
                    let item = match key {
                        Value::Text(text) if text.starts_with('@') && text.len() > 1 => {
                            Item::Field(Field::Attr(text[1..].to_string(), value))
                        }
                        key => Item::Field(Field::Slot(key, value)),
                    };
                    record.push(item);
                }
                Ok(Value::Record(record))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(key: &str, value: impl Into<Value>) -> Item {
        Item::slot(key, value)
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42), Value::Number(42.0));
        assert_eq!(Value::from(2.5), Value::Number(2.5));
        assert_eq!(Value::from("test"), Value::Text("test".to_string()));
    }

    #[test]
    fn test_lookup_returns_absent_for_missing() {
        let value = Value::from(vec![slot("a", 1)]);
        assert_eq!(value.get("a"), &Value::Number(1.0));
        assert!(value.get("b").is_absent());
        assert!(Value::from(42).get("a").is_absent());
    }

    #[test]
    fn test_indexed_access() {
        let value = Value::from(vec![Item::from(1), Item::from(2)]);
        assert_eq!(value.first(), &Item::from(1));
        assert_eq!(value.last(), &Item::from(2));
        assert_eq!(value.get_item(1), &Item::from(2));
        assert!(value.get_item(5).value().is_absent());
    }

    #[test]
    fn test_last_match_wins_without_index() {
        let record = Record::from(vec![slot("k", 1), slot("k", 2)]);
        assert_eq!(record.get_text_key("k"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_last_match_wins_with_index() {
        let mut record = Record::new();
        for i in 0..INDEX_THRESHOLD + 1 {
            record.push(slot("pad", i as i64));
        }
        record.push(slot("k", 1));
        record.push(slot("k", 2));
        assert!(record.index.is_some());
        assert_eq!(record.get_text_key("k"), Some(&Value::Number(2.0)));
        assert_eq!(
            record.get_text_key("pad"),
            Some(&Value::Number(INDEX_THRESHOLD as f64))
        );
    }

    #[test]
    fn test_equality_and_hash_ignore_index() {
        let items: Vec<Item> = (0..INDEX_THRESHOLD + 2)
            .map(|i| Item::slot(format!("k{i}"), i as i64))
            .collect();

        let mut pushed = Record::new();
        for item in items.clone() {
            pushed.push(item);
        }
        let unindexed = Record {
            items,
            index: None,
        };

        assert!(pushed.index.is_some());
        assert!(unindexed.index.is_none());
        assert_eq!(pushed, unindexed);
        assert_eq!(pushed.hash_code(), unindexed.hash_code());
    }

    #[test]
    fn test_attr_key_is_text() {
        let field = Field::Attr("name".to_string(), Value::Extant);
        assert_eq!(field.key(), Value::from("name"));
    }

    #[test]
    fn test_bool_and_text_are_distinct() {
        assert_ne!(Value::Bool(true), Value::from("true"));
        assert_ne!(
            Value::Bool(true).hash_code(),
            Value::from("true").hash_code()
        );
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(
            Value::Number(0.0).hash_code(),
            Value::Number(-0.0).hash_code()
        );
    }

    #[test]
    fn test_markup_safe() {
        assert!(Record::from(vec![Item::attr("em"), Item::from("x")]).is_markup_safe());
        assert!(!Record::from(vec![Item::from("x")]).is_markup_safe());
        assert!(!Record::new().is_markup_safe());
        assert!(
            !Record::from(vec![Item::attr("a"), Item::attr("b")]).is_markup_safe()
        );
    }

    #[test]
    fn test_block_safe() {
        assert!(Record::from(vec![slot("a", 1)]).is_block_safe());
        assert!(!Record::from(vec![Item::attr("a")]).is_block_safe());
    }
}
