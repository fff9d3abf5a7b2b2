//! Log Entry Module
//!
//! The value object stored in the backlog and its record codec.
//!
//! ## Responsibilities
//! - Define `LogEntry` and the ordered `Severity` scale
//! - Generate unique entry keys and creation timestamps
//! - Convert entries to/from self-describing JSON records
//! - Scrub and memoize per-request environment snapshots
//!
//! ## Record Format
//! ```text
//! {"message":"..","progname":"..","severity":3,"timestamp":1700000000000,
//!  "key":"9f86d081884c7d659a2feaa0c55ad015","backtrace":null,"env":null}
//! ```

mod codec;
mod environment;

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BacklogError;

pub use codec::{decode, encode};
pub use environment::{EnvironmentCache, RequestContext, ALLOWED_ENV};

/// Scrubbed request variables attached to an entry
///
/// Keeps insertion order so a decoded record re-encodes byte for byte.
pub type Environment = IndexMap<String, String>;

/// Number of random bytes behind an entry key (hex doubles it)
const KEY_BYTES: usize = 16;

/// Ordered log level
///
/// Serialized as its integer value so records stay compact and comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    Unknown = 5,
}

impl Severity {
    /// All levels, lowest first
    pub const ALL: [Severity; 6] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = BacklogError;

    fn try_from(value: u8) -> Result<Self, BacklogError> {
        Severity::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| BacklogError::MalformedRecord(format!("unknown severity: {}", value)))
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity as u8
    }
}

impl FromStr for Severity {
    type Err = BacklogError;

    /// Accepts a level name (any case) or its number
    fn from_str(s: &str) -> Result<Self, BacklogError> {
        if let Ok(n) = s.parse::<u8>() {
            return Severity::try_from(n);
        }
        Severity::ALL
            .iter()
            .copied()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BacklogError::Config(format!("unknown severity: {:?}", s)))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single retained log record
///
/// Field order is the record's field order; keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Free-form text, possibly empty
    pub message: String,

    /// Name of the emitting program or component
    pub progname: String,

    pub severity: Severity,

    /// Creation time (unix millis)
    pub timestamp: u64,

    /// Opaque cursor handle; never reused
    pub key: String,

    pub backtrace: Option<String>,

    #[serde(rename = "env")]
    pub environment: Option<Environment>,
}

impl LogEntry {
    /// Create an entry stamped with the current time and a fresh key
    pub fn new(severity: Severity, progname: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_identity(severity, progname, message, now_millis(), generate_key())
    }

    /// Create an entry with a caller-supplied timestamp and key
    pub fn with_identity(
        severity: Severity,
        progname: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
        key: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            progname: progname.into(),
            severity,
            timestamp,
            key: key.into(),
            backtrace: None,
            environment: None,
        }
    }

    /// Attach a backtrace
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Attach an environment snapshot
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Generate a new entry key: 16 random bytes, lowercase hex
pub fn generate_key() -> String {
    let bytes: [u8; KEY_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Current time in unix milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
