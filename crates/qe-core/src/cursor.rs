//! Opaque pagination cursors
//!
//! A cursor records the ordering-key values of the row at a page boundary.
//! The engine never interprets the values; whichever adapter produced a
//! cursor is the one that reads it back. On the wire it is URL-safe base64
//! of the JSON-encoded `(field, value)` pairs.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QueryError, QueryResult};
use crate::types::Value;

/// Anchor for cursor-based paging
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    values: Vec<(String, Value)>,
}

impl Cursor {
    /// Build a cursor from field/value pairs.
    ///
    /// Pairs keep their first-insertion order. A repeated field replaces the
    /// earlier value in place.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut pairs: Vec<(String, Value)> = Vec::new();
        for (key, value) in values {
            let key = key.into();
            let value = value.into();
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => pairs.push((key, value)),
            }
        }
        Self { values: pairs }
    }

    /// Value recorded for a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Recorded pairs in insertion order
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode to an opaque, URL-safe token
    pub fn encode(&self) -> String {
        // Infallible for string keys and Value payloads
        let json = serde_json::to_vec(&self.values).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`Cursor::encode`]
    pub fn decode(token: &str) -> QueryResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| QueryError::InvalidCursor {
                reason: e.to_string(),
            })?;
        let values: Vec<(String, Value)> =
            serde_json::from_slice(&bytes).map_err(|e| QueryError::InvalidCursor {
                reason: e.to_string(),
            })?;
        Ok(Self::from_values(values))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Cursor::decode(&token).map_err(serde::de::Error::custom)
    }
}
