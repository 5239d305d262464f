//! Store Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Entry Value ==
/// Payload held under a key: a plain value or an append-only list.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// Plain byte value written by SET / SETEX / INCR
    Bytes(Vec<u8>),
    /// Ordered list written by RPUSH
    List(Vec<Vec<u8>>),
}

impl EntryValue {
    /// Name of the payload kind, used in wrong-type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryValue::Bytes(_) => "string",
            EntryValue::List(_) => "list",
        }
    }
}

// == Store Entry ==
/// Represents a single store entry with value and metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub value: EntryValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new store entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl` - Optional time to live; a deadline past the u64 millisecond
    ///   range means the entry never expires
    pub fn new(value: EntryValue, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl.and_then(|ttl| {
            u64::try_from(ttl.as_millis())
                .ok()
                .and_then(|ms| now.checked_add(ms))
        });

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
