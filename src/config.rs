//! Configuration for Backlog
//!
//! Centralized configuration with sensible defaults. Every knob that gates
//! what `Store::report` accepts lives here; there is no hidden global state.

use std::path::PathBuf;

use regex::Regex;

use crate::entry::Severity;

/// Main configuration for a Backlog store and its list service
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of retained entries; the oldest are evicted first
    pub max_backlog: u64,

    /// Entries below this severity are dropped at write time
    pub min_severity: Option<Severity>,

    /// Drop an entry identical (severity, progname, message) to the newest one
    pub dedup_enabled: bool,

    /// Entries whose message matches any of these are dropped
    pub ignore_patterns: Vec<Regex>,

    /// Drop entries with an empty message
    pub skip_empty: bool,

    /// Capture the caller's stack when no backtrace is supplied
    pub capture_backtrace: bool,

    /// How the head is trimmed after a push overflows `max_backlog`
    pub trim_strategy: TrimStrategy,

    /// Name of the list holding the entries on the list service
    pub list_key: String,

    /// Page size used when a query does not set one
    pub default_page_limit: usize,

    // -------------------------------------------------------------------------
    // Journal Configuration
    // -------------------------------------------------------------------------
    /// Root directory for durable lists
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {list_key}.journal   (one journal per list)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the journal
    pub journal_sync_strategy: JournalSyncStrategy,

    /// Retired (popped) records tolerated before the journal is rewritten
    pub compaction_threshold: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections (served plus queued)
    pub max_connections: usize,

    /// Threads serving connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// Head trimming after a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStrategy {
    /// At most one pop per append; concurrent appends may leave the list
    /// above capacity until later appends catch up
    SinglePop,

    /// Pop until the length is back within capacity
    ToCapacity,
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy)]
pub enum JournalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced operations (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_backlog: 1000,
            min_severity: None,
            dedup_enabled: false,
            ignore_patterns: Vec::new(),
            skip_empty: true,
            capture_backtrace: true,
            trim_strategy: TrimStrategy::ToCapacity,
            list_key: "__BACKLOG__LOG".to_string(),
            default_page_limit: 50,
            data_dir: PathBuf::from("./backlog_data"),
            journal_sync_strategy: JournalSyncStrategy::EveryNEntries { count: 100 },
            compaction_threshold: 4096,
            listen_addr: "127.0.0.1:6380".to_string(),
            max_connections: 1024,
            worker_threads: 16,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the retained-entry capacity
    pub fn max_backlog(mut self, max: u64) -> Self {
        self.config.max_backlog = max;
        self
    }

    /// Set the minimum accepted severity
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.config.min_severity = Some(severity);
        self
    }

    /// Enable or disable dropping consecutive duplicates
    pub fn dedup(mut self, enabled: bool) -> Self {
        self.config.dedup_enabled = enabled;
        self
    }

    /// Add a pattern whose matching messages are never stored
    pub fn ignore_pattern(mut self, pattern: Regex) -> Self {
        self.config.ignore_patterns.push(pattern);
        self
    }

    /// Enable or disable dropping empty messages
    pub fn skip_empty(mut self, enabled: bool) -> Self {
        self.config.skip_empty = enabled;
        self
    }

    /// Enable or disable implicit backtrace capture
    pub fn capture_backtrace(mut self, enabled: bool) -> Self {
        self.config.capture_backtrace = enabled;
        self
    }

    /// Set the head trimming strategy
    pub fn trim_strategy(mut self, strategy: TrimStrategy) -> Self {
        self.config.trim_strategy = strategy;
        self
    }

    /// Set the list name on the list service
    pub fn list_key(mut self, key: impl Into<String>) -> Self {
        self.config.list_key = key.into();
        self
    }

    /// Set the page size used when a query leaves it unset
    pub fn default_page_limit(mut self, limit: usize) -> Self {
        self.config.default_page_limit = limit;
        self
    }

    /// Set the data directory (root for all journals)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the journal sync strategy
    pub fn journal_sync_strategy(mut self, strategy: JournalSyncStrategy) -> Self {
        self.config.journal_sync_strategy = strategy;
        self
    }

    /// Set how many retired records trigger a journal rewrite
    pub fn compaction_threshold(mut self, threshold: u64) -> Self {
        self.config.compaction_threshold = threshold;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
