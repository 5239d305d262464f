//! Value Module
//!
//! Stored values, generated cache keys and typed decoding of raw bytes.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{CacheError, Result};

// == Stored Value ==
/// A scalar or binary value handed to the cache.
///
/// Encoded the way a Redis client sends scalars: strings as UTF-8, numbers
/// in decimal text, bytes verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl StoredValue {
    /// Encodes the value into the bytes written to the store.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            StoredValue::Str(s) => s.into_bytes(),
            StoredValue::Int(i) => i.to_string().into_bytes(),
            StoredValue::Float(f) => f.to_string().into_bytes(),
            StoredValue::Bytes(b) => b,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Str(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Str(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

// == Cache Key ==
/// Identifier generated for every stored value: a random UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Generates a fresh, never reused key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Decode ==
/// Conversion from raw stored bytes into a typed value.
pub trait Decode: Sized {
    fn decode(raw: &[u8]) -> Result<Self>;
}

impl Decode for Vec<u8> {
    fn decode(raw: &[u8]) -> Result<Self> {
        Ok(raw.to_vec())
    }
}

impl Decode for String {
    fn decode(raw: &[u8]) -> Result<Self> {
        String::from_utf8(raw.to_vec())
            .map_err(|e| CacheError::Conversion(format!("Value is not valid UTF-8: {}", e)))
    }
}

impl Decode for i64 {
    fn decode(raw: &[u8]) -> Result<Self> {
        let text = String::decode(raw)?;
        text.parse()
            .map_err(|_| CacheError::Conversion(format!("Value '{}' is not an integer", text)))
    }
}

impl Decode for f64 {
    fn decode(raw: &[u8]) -> Result<Self> {
        let text = String::decode(raw)?;
        text.parse()
            .map_err(|_| CacheError::Conversion(format!("Value '{}' is not a float", text)))
    }
}
