//! Codecs between records and stored strings.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::reactive::Record;

/// Encodes a whole record for storage and decodes it back.
///
/// `decode` must reject anything that is not object-shaped.
pub trait Codec: Send + Sync + 'static {
    fn encode(&self, record: &Record) -> Result<String>;

    fn decode(&self, raw: &str) -> Result<Record>;
}

/// JSON text; accepts any JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, record: &Record) -> Result<String> {
        Ok(serde_json::to_string(&record.to_value())?)
    }

    fn decode(&self, raw: &str) -> Result<Record> {
        Record::from_value(serde_json::from_str(raw)?)
    }
}

/// JSON text that must also decode as `T`.
///
/// Payloads missing a required field or holding a field of the wrong type
/// are rejected, so a key written by an unrelated component cannot leak
/// into the container.
pub struct SchemaCodec<T> {
    _shape: PhantomData<fn() -> T>,
}

impl<T> SchemaCodec<T> {
    pub fn new() -> Self {
        Self {
            _shape: PhantomData,
        }
    }
}

impl<T> Default for SchemaCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for SchemaCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn encode(&self, record: &Record) -> Result<String> {
        JsonCodec.encode(record)
    }

    fn decode(&self, raw: &str) -> Result<Record> {
        let shaped: T = serde_json::from_str(raw)?;
        Record::from_serialize(&shaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactiveError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Serialize, Deserialize)]
    struct Prefs {
        theme: String,
    }

    #[test]
    fn json_codec_round_trips_objects() {
        let record = Record::from_value(json!({ "a": 1, "b": [true] })).unwrap();
        let raw = JsonCodec.encode(&record).unwrap();
        assert_eq!(JsonCodec.decode(&raw).unwrap(), record);
    }

    #[test]
    fn json_codec_rejects_non_objects() {
        assert!(matches!(
            JsonCodec.decode("[1, 2]"),
            Err(ReactiveError::InvalidArgument(_))
        ));
        assert!(matches!(JsonCodec.decode("{oops"), Err(ReactiveError::Codec(_))));
    }

    #[test]
    fn schema_codec_checks_shape() {
        let codec = SchemaCodec::<Prefs>::new();

        let record = codec.decode(r#"{ "theme": "dark" }"#).unwrap();
        assert_eq!(record.get(&"theme".into()), Some(&json!("dark")));

        assert!(codec.decode(r#"{ "colour": "dark" }"#).is_err());
        assert!(JsonCodec.decode(r#"{ "colour": "dark" }"#).is_ok());
    }
}
