//! Plain records wrapped by reactive containers.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ReactiveError, Result};
use crate::graph::FieldKey;

/// An ordered set of fields holding JSON values.
///
/// Named fields take part in serialization; symbol fields are in-memory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<FieldKey, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(name, value)| (FieldKey::Name(name), value))
                    .collect(),
            }),
            other => Err(ReactiveError::InvalidArgument(format!(
                "expected an object-like value, got {}",
                kind(&other)
            ))),
        }
    }

    /// Serialize `value` and build a record from the result.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    pub fn get(&self, key: &FieldKey) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, returning its previous value.
    pub fn insert(&mut self, key: impl Into<FieldKey>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Value)> {
        self.fields.iter()
    }

    /// The named fields as a JSON object. Symbol fields are skipped.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|(key, value)| key.as_name().map(|name| (name.to_owned(), value.clone())))
            .collect();
        Value::Object(map)
    }

    /// Deserialize the named fields into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl IntoIterator for Record {
    type Item = (FieldKey, Value);
    type IntoIter = indexmap::map::IntoIter<FieldKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Symbol;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Settings {
        theme: String,
        volume: u8,
    }

    #[test]
    fn primitives_are_rejected() {
        for value in [json!(1), json!("text"), json!(null), json!([1, 2])] {
            let err = Record::from_value(value).unwrap_err();
            assert!(matches!(err, ReactiveError::InvalidArgument(_)));
        }
    }

    #[test]
    fn structs_round_trip() {
        let settings = Settings {
            theme: "dark".into(),
            volume: 7,
        };
        let record = Record::from_serialize(&settings).unwrap();

        assert_eq!(record.get(&"theme".into()), Some(&json!("dark")));
        assert_eq!(record.deserialize::<Settings>().unwrap(), settings);
    }

    #[test]
    fn symbol_fields_are_not_serialized() {
        let mut record = Record::from_value(json!({ "a": 1 })).unwrap();
        record.insert(Symbol::new("hidden"), json!(true));

        assert_eq!(record.len(), 2);
        assert_eq!(record.to_value(), json!({ "a": 1 }));
    }

    #[test]
    fn field_order_is_preserved() {
        let mut record = Record::new();
        record.insert("z", json!(1));
        record.insert("a", json!(2));
        record.insert("m", json!(3));

        let names: Vec<_> = record.keys().filter_map(FieldKey::as_name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
