//! Cardinality Resolver
//!
//! Normalises the three response shapes the API uses (empty body, a bare
//! record, a `records` collection) and decides what a zero-or-one read means.

use super::decode::RawRecord;
use crate::error::excerpt;
use serde_json::Value;
use thiserror::Error;

/// Key holding the collection in list responses
pub const RECORDS_KEY: &str = "records";

/// Keys that describe a response rather than a record. An object holding
/// only these carries no record (e.g. `{"num_records": 0}` or a 202 `job`).
pub const ENVELOPE_KEYS: &[&str] = &["num_records", "_links", "job"];

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// No body, an empty object, or envelope metadata only
    Empty,
    /// A bare record (e.g. `GET /cluster`, `GET /path/{uuid}`)
    One(RawRecord),
    /// A `records` collection, possibly empty
    Many(Vec<RawRecord>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed response envelope: {reason}")]
pub struct MalformedEnvelope {
    pub reason: String,
    /// Excerpt of the offending part of the body
    pub raw: String,
}

impl MalformedEnvelope {
    fn new(reason: String, offending: &Value) -> Self {
        Self {
            reason,
            raw: excerpt(&offending.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected at most one record, got {count}")]
pub struct Ambiguous {
    pub count: usize,
    /// Excerpt of the competing records
    pub raw: String,
}

impl ResponseEnvelope {
    pub fn parse(body: Value) -> Result<Self, MalformedEnvelope> {
        let mut map = match body {
            Value::Null => return Ok(Self::Empty),
            Value::Object(map) => map,
            other => {
                return Err(MalformedEnvelope::new(
                    "expected an object".to_string(),
                    &other,
                ))
            }
        };

        let Some(records) = map.remove(RECORDS_KEY) else {
            let metadata_only = map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str()));
            return Ok(if metadata_only {
                Self::Empty
            } else {
                Self::One(map)
            });
        };

        let Value::Array(items) = records else {
            return Err(MalformedEnvelope::new(
                format!("'{}' is not an array", RECORDS_KEY),
                &records,
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(MalformedEnvelope::new(
                    format!("'{}[{}]' is not an object", RECORDS_KEY, idx),
                    &other,
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Many)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }

    /// First record of the envelope, used where the server echoes created
    /// records and the first one is authoritative
    pub fn into_first(self) -> Option<RawRecord> {
        self.into_records().into_iter().next()
    }
}

/// Zero records is absence, one is the answer, more is ambiguous
pub fn resolve_zero_or_one(envelope: ResponseEnvelope) -> Result<Option<RawRecord>, Ambiguous> {
    match envelope.len() {
        0 => Ok(None),
        1 => Ok(envelope.into_first()),
        count => Err(Ambiguous {
            count,
            raw: excerpt(&serde_json::to_string(&envelope.into_records()).unwrap_or_default()),
        }),
    }
}
