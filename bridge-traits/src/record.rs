//! Structured record model
//!
//! A [`Record`] is the payload shape that crosses the host boundary whenever
//! an event carries more than a scalar: user profiles, document field maps and
//! blob directory listings. Keys keep their insertion order so hosts see
//! fields in the order the core produced them.
//!
//! Values are restricted to the closed set in [`Value`]. Backends that speak
//! JSON can convert with [`Record::from_json`] and [`Record::to_json`].

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

/// A single field value inside a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Boolean(bool),
    Number(f64),
    /// Ordered sequence of text items (e.g. file names).
    TextList(Vec<String>),
    Record(Record),
    /// The field is known but has no value (e.g. a user without a photo).
    Absent,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Value::TextList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Convert to a JSON value. Non-finite numbers become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Text(text) => JsonValue::String(text.clone()),
            Value::Boolean(flag) => JsonValue::Bool(*flag),
            Value::Number(number) => Number::from_f64(*number)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::TextList(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            Value::Record(record) => record.to_json(),
            Value::Absent => JsonValue::Null,
        }
    }

    /// Convert from a JSON value.
    ///
    /// Arrays always become [`Value::TextList`]; string items are kept as-is
    /// and any other item is rendered as its JSON text.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Absent,
            JsonValue::Bool(flag) => Value::Boolean(flag),
            JsonValue::Number(number) => number.as_f64().map(Value::Number).unwrap_or(Value::Absent),
            JsonValue::String(text) => Value::Text(text),
            JsonValue::Array(items) => Value::TextList(
                items
                    .into_iter()
                    .map(|item| match item {
                        JsonValue::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            JsonValue::Object(map) => Value::Record(Record::from_json_map(map)),
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::TextList(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Absent)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Ordered string-keyed map of [`Value`]s.
///
/// Inserting an existing key replaces its value in place, keeping the
/// original position.
///
/// # Examples
///
/// ```
/// use bridge_traits::record::{Record, Value};
///
/// let record = Record::new()
///     .with("files", vec!["a.png".to_string()])
///     .with("folders", Vec::<String>::new());
///
/// assert_eq!(record.keys().collect::<Vec<_>>(), vec!["files", "folders"]);
/// assert_eq!(
///     record.get("files").and_then(Value::as_text_list),
///     Some(&["a.png".to_string()][..])
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `true` when the key is missing or explicitly [`Value::Absent`].
    pub fn is_absent(&self, key: &str) -> bool {
        self.get(key).map_or(true, Value::is_absent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Overwrite the fields present in `other`, leaving the rest untouched.
    pub fn merge(&mut self, other: Record) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            map.insert(key.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }

    /// Build a record from a JSON object. Returns `None` for any other JSON type.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) => Some(Self::from_json_map(map)),
            _ => None,
        }
    }

    fn from_json_map(map: Map<String, JsonValue>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, Value::from_json(value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
