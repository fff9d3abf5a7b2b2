//! Record codec
//!
//! JSON encoding for stored entries. Optional fields are written as `null`
//! so that an absent value never reads back as an empty string.

use crate::error::{BacklogError, Result};

use super::LogEntry;

/// Encode an entry as a single-line JSON record
pub fn encode(entry: &LogEntry) -> Result<String> {
    serde_json::to_string(entry).map_err(|e| BacklogError::Serialization(e.to_string()))
}

/// Decode a JSON record back into an entry
///
/// Any parse or shape failure is reported as `MalformedRecord`; callers
/// scanning many records skip the offending one.
pub fn decode(record: &str) -> Result<LogEntry> {
    serde_json::from_str(record).map_err(|e| BacklogError::MalformedRecord(e.to_string()))
}
