//! Store Module
//!
//! The bounded backlog: write-time gating and eviction, read-time cursor
//! resolution and filtered paging, all on top of a `ListBackend`.
//!
//! ## Responsibilities
//! - Gate reports (empty, severity, ignore patterns, duplicates)
//! - Push encoded entries at the tail, evict from the head past capacity
//! - Resolve cursor keys to index windows without an index
//! - Assemble filtered pages in chronological order
//!
//! ## Consistency
//! The store holds no lock of its own. Each backend primitive is atomic, but
//! push-then-trim and multi-window scans are not: concurrent writers can
//! leave the list briefly above (or one below) capacity, and a scan racing
//! with appends can see a shifted list, returning gaps, repeats, or a
//! missed cursor. Callers that need more must coordinate externally.

mod query;
mod scan;

use std::backtrace::Backtrace;
use std::net::ToSocketAddrs;
use std::sync::Arc;

use crate::config::{Config, TrimStrategy};
use crate::entry::{self, EnvironmentCache, LogEntry, RequestContext, Severity};
use crate::error::Result;
use crate::list::{FileList, ListBackend, MemoryList, RemoteList};

pub use query::{Cursor, PageQuery, Search};

/// Per-report extras
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions<'a> {
    /// Explicit backtrace; the caller's stack is captured when unset
    pub backtrace: Option<&'a str>,

    /// Request the entry is reported from
    pub context: Option<&'a RequestContext>,
}

impl<'a> ReportOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backtrace(mut self, backtrace: &'a str) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    pub fn context(mut self, context: &'a RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Capacity-bounded log store over an ordered list
pub struct Store<B> {
    config: Config,
    backend: B,
    environments: Arc<EnvironmentCache>,
}

impl<B: ListBackend> Store<B> {
    pub fn new(config: Config, backend: B) -> Self {
        Self::with_environments(config, backend, Arc::new(EnvironmentCache::new()))
    }

    /// Share one environment cache between several stores
    pub fn with_environments(config: Config, backend: B, environments: Arc<EnvironmentCache>) -> Self {
        Self {
            config,
            backend,
            environments,
        }
    }

    /// Report a log message
    ///
    /// Steps:
    /// 1. Drop it if gated (empty, below minimum, ignored, duplicate)
    /// 2. Build the entry with backtrace and environment
    /// 3. Push it at the tail and trim the head past capacity
    ///
    /// Returns the new entry's key, or `None` when the report was dropped.
    pub fn report(
        &self,
        severity: Severity,
        progname: &str,
        message: &str,
        options: ReportOptions<'_>,
    ) -> Result<Option<String>> {
        if !self.accepts(severity, progname, message)? {
            return Ok(None);
        }

        let mut entry = LogEntry::new(severity, progname, message);

        entry.backtrace = match options.backtrace {
            Some(backtrace) => Some(backtrace.to_string()),
            None if self.config.capture_backtrace => {
                Some(Backtrace::force_capture().to_string())
            }
            None => None,
        };

        if let Some(context) = options.context {
            entry.environment = Some(self.environments.snapshot(context).as_ref().clone());
        }

        self.push_entry(&entry)?;
        Ok(Some(entry.key))
    }

    /// Store a fully built entry, bypassing report gating
    pub fn push_entry(&self, entry: &LogEntry) -> Result<()> {
        let record = entry::encode(entry)?;
        self.backend.push_tail(&record)?;
        self.trim()
    }

    /// Number of retained entries
    pub fn count(&self) -> Result<u64> {
        self.backend.length()
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        tracing::info!("Clearing backlog {:?}", self.config.list_key);
        self.backend.delete_all()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Memoized request environments; release contexts when they finish
    pub fn environments(&self) -> &Arc<EnvironmentCache> {
        &self.environments
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write-time gating
    fn accepts(&self, severity: Severity, progname: &str, message: &str) -> Result<bool> {
        if self.config.skip_empty && message.is_empty() {
            return Ok(false);
        }

        if let Some(min) = self.config.min_severity {
            if severity < min {
                return Ok(false);
            }
        }

        if self.config.ignore_patterns.iter().any(|re| re.is_match(message)) {
            tracing::trace!("Ignored message matching an ignore pattern");
            return Ok(false);
        }

        if self.config.dedup_enabled && self.repeats_newest(severity, progname, message)? {
            tracing::trace!("Dropped duplicate of newest entry");
            return Ok(false);
        }

        Ok(true)
    }

    /// Whether the newest retained entry carries the same report
    fn repeats_newest(&self, severity: Severity, progname: &str, message: &str) -> Result<bool> {
        let newest = self.backend.range(-1, -1)?;
        Ok(newest
            .first()
            .and_then(|record| self.decode_record(record))
            .map_or(false, |entry| {
                entry.severity == severity && entry.progname == progname && entry.message == message
            }))
    }

    /// Evict from the head until within capacity
    fn trim(&self) -> Result<()> {
        let max = self.config.max_backlog;

        match self.config.trim_strategy {
            TrimStrategy::SinglePop => {
                if self.backend.length()? > max {
                    self.backend.pop_head()?;
                }
            }
            TrimStrategy::ToCapacity => {
                while self.backend.length()? > max {
                    if self.backend.pop_head()?.is_none() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Decode one stored record, skipping (and logging) malformed ones
    pub(crate) fn decode_record(&self, record: &str) -> Option<LogEntry> {
        match entry::decode(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping record in {:?}: {}", self.config.list_key, e);
                None
            }
        }
    }
}

impl Store<MemoryList> {
    /// Store over a fresh in-process list
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, MemoryList::new())
    }
}

impl Store<FileList> {
    /// Open or create a store journaled under `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        let list = FileList::open_in(
            &config.data_dir,
            &config.list_key,
            config.journal_sync_strategy,
            config.compaction_threshold,
        )?;
        Ok(Self::new(config, list))
    }
}

impl Store<RemoteList> {
    /// Connect to a list service holding `config.list_key`
    pub fn connect(config: Config, addr: impl ToSocketAddrs) -> Result<Self> {
        let list = RemoteList::connect(addr, config.list_key.clone())?;
        list.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
        Ok(Self::new(config, list))
    }
}
