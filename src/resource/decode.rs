//! Response Decoder
//!
//! Maps untyped records into domain types through explicit per-field reads.
//! A JSON `null` counts as absent. Either the whole record decodes or the
//! caller gets a [`DecodeFailure`] naming the offending field path.

use serde_json::{Map, Value};
use thiserror::Error;

/// Untyped record exactly as received from the transport
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' value {value} out of range")]
    OutOfRange { field: String, value: String },
}

/// Domain types that decode from a raw record
pub trait FromRecord: Sized {
    fn from_record(reader: &RecordReader<'_>) -> Result<Self, DecodeFailure>;
}

/// Domain types that encode into a raw record (request bodies, fixtures)
pub trait ToRecord {
    fn to_record(&self) -> RawRecord;
}

/// Decode a whole record into `T`
pub fn decode<T: FromRecord>(record: &RawRecord) -> Result<T, DecodeFailure> {
    T::from_record(&RecordReader::new(record))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field-by-field view over a raw record
pub struct RecordReader<'a> {
    record: &'a RawRecord,
    prefix: Option<String>,
}

impl<'a> RecordReader<'a> {
    pub fn new(record: &'a RawRecord) -> Self {
        Self {
            record,
            prefix: None,
        }
    }

    fn path(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.record.get(key).filter(|v| !v.is_null())
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &Value) -> DecodeFailure {
        DecodeFailure::TypeMismatch {
            field: self.path(key),
            expected,
            found: kind_of(found),
        }
    }

    fn missing(&self, key: &str) -> DecodeFailure {
        DecodeFailure::MissingField {
            field: self.path(key),
        }
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<String>, DecodeFailure> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(key, "string", other)),
        }
    }

    pub fn str(&self, key: &str) -> Result<String, DecodeFailure> {
        self.opt_str(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn opt_int(&self, key: &str) -> Result<Option<i64>, DecodeFailure> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None => Err(DecodeFailure::OutOfRange {
                    field: self.path(key),
                    value: n.to_string(),
                }),
            },
            Some(other) => Err(self.mismatch(key, "integer", other)),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, DecodeFailure> {
        self.opt_int(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn u32(&self, key: &str) -> Result<u32, DecodeFailure> {
        let value = self.int(key)?;
        u32::try_from(value).map_err(|_| DecodeFailure::OutOfRange {
            field: self.path(key),
            value: value.to_string(),
        })
    }

    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>, DecodeFailure> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(key, "boolean", other)),
        }
    }

    /// Reader over a nested object, if present
    pub fn opt_child(&self, key: &str) -> Result<Option<RecordReader<'a>>, DecodeFailure> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(RecordReader {
                record: map,
                prefix: Some(self.path(key)),
            })),
            Some(other) => Err(self.mismatch(key, "object", other)),
        }
    }

    pub fn child(&self, key: &str) -> Result<RecordReader<'a>, DecodeFailure> {
        self.opt_child(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn opt_nested<T: FromRecord>(&self, key: &str) -> Result<Option<T>, DecodeFailure> {
        self.opt_child(key)?
            .map(|reader| T::from_record(&reader))
            .transpose()
    }

    pub fn nested<T: FromRecord>(&self, key: &str) -> Result<T, DecodeFailure> {
        T::from_record(&self.child(key)?)
    }
}

/// Builder for outgoing records; `None` values are left out
#[derive(Debug, Default)]
pub struct RecordWriter {
    record: RawRecord,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn str(mut self, key: &str, value: &str) -> Self {
        self.record
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn opt_str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.str(key, v),
            None => self,
        }
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.record.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.int(key, v),
            None => self,
        }
    }

    pub fn nested<T: ToRecord>(mut self, key: &str, value: &T) -> Self {
        self.record
            .insert(key.to_string(), Value::Object(value.to_record()));
        self
    }

    pub fn opt_nested<T: ToRecord>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(v) => self.nested(key, v),
            None => self,
        }
    }

    pub fn finish(self) -> RawRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Inner {
        address: String,
    }

    impl FromRecord for Inner {
        fn from_record(reader: &RecordReader<'_>) -> Result<Self, DecodeFailure> {
            Ok(Self {
                address: reader.str("address")?,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Outer {
        name: String,
        count: Option<i64>,
        inner: Inner,
    }

    impl FromRecord for Outer {
        fn from_record(reader: &RecordReader<'_>) -> Result<Self, DecodeFailure> {
            Ok(Self {
                name: reader.str("name")?,
                count: reader.opt_int("count")?,
                inner: reader.nested("inner")?,
            })
        }
    }

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_decode_nested() {
        let raw = record(json!({"name": "r1", "count": 3, "inner": {"address": "10.0.0.1"}}));
        let outer: Outer = decode(&raw).unwrap();
        assert_eq!(outer.name, "r1");
        assert_eq!(outer.count, Some(3));
        assert_eq!(outer.inner.address, "10.0.0.1");
    }

    #[test]
    fn test_null_is_absent() {
        let raw = record(json!({"name": "r1", "count": null, "inner": {"address": "a"}}));
        let outer: Outer = decode(&raw).unwrap();
        assert_eq!(outer.count, None);
    }

    #[test]
    fn test_missing_nested_structure_fails() {
        let raw = record(json!({"name": "r1"}));
        let err = decode::<Outer>(&raw).unwrap_err();
        assert_eq!(err, DecodeFailure::MissingField { field: "inner".into() });
    }

    #[test]
    fn test_type_mismatch_reports_nested_path() {
        let raw = record(json!({"name": "r1", "inner": {"address": 42}}));
        let err = decode::<Outer>(&raw).unwrap_err();
        assert_eq!(
            err,
            DecodeFailure::TypeMismatch {
                field: "inner.address".into(),
                expected: "string",
                found: "number",
            }
        );
        assert_eq!(err.to_string(), "field 'inner.address' expected string, found number");
    }

    #[test]
    fn test_fractional_integer_is_out_of_range() {
        let raw = record(json!({"name": "r1", "count": 1.5, "inner": {"address": "a"}}));
        assert!(matches!(
            decode::<Outer>(&raw),
            Err(DecodeFailure::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_u32_rejects_negative() {
        let raw = record(json!({"major": -1}));
        let reader = RecordReader::new(&raw);
        assert!(matches!(reader.u32("major"), Err(DecodeFailure::OutOfRange { .. })));
    }

    #[test]
    fn test_writer_skips_none() {
        let raw = RecordWriter::new()
            .str("name", "r1")
            .opt_str("comment", None)
            .opt_int("metric", Some(20))
            .finish();
        assert_eq!(Value::Object(raw), json!({"name": "r1", "metric": 20}));
    }
}
