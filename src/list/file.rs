//! Journaled list
//!
//! Records are held in memory and every mutation is journaled first, so the
//! list survives restarts. Lock order for mutations: journal → records.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::config::JournalSyncStrategy;
use crate::error::Result;
use crate::journal::{JournalOp, JournalRecovery, JournalWriter};

use super::{resolve_range, ListBackend};

/// Durable ordered list backed by a journal file
pub struct FileList {
    /// Journal (exclusive access needed)
    journal: Mutex<JournalState>,

    /// Live records, oldest first
    records: RwLock<VecDeque<String>>,

    /// Retired records tolerated before rewriting the journal
    compaction_threshold: u64,
}

struct JournalState {
    writer: JournalWriter,

    /// Journaled records no longer live (popped or cleared)
    retired: u64,
}

impl FileList {
    /// Open or create a list journaled at `path`
    ///
    /// On open:
    /// 1. Replay the journal if it exists (truncating a torn tail)
    /// 2. Rebuild the records in memory
    /// 3. Continue appending after the last valid entry
    pub fn open(
        path: &Path,
        sync_strategy: JournalSyncStrategy,
        compaction_threshold: u64,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut records = VecDeque::new();
        let mut retired = 0u64;
        let mut next_lsn = 0;

        if path.exists() {
            let (entries, recovery) = JournalRecovery::recover(path)?;

            if recovery.entries_recovered > 0 || recovery.was_truncated {
                tracing::info!(
                    "Journal {} replayed: {} entries, truncated={}",
                    path.display(),
                    recovery.entries_recovered,
                    recovery.was_truncated
                );
            }

            for entry in entries {
                match entry.op {
                    JournalOp::Push { record } => records.push_back(record),
                    JournalOp::PopHead => {
                        if records.pop_front().is_some() {
                            retired += 1;
                        }
                    }
                    JournalOp::Clear => {
                        retired += records.len() as u64;
                        records.clear();
                    }
                }
            }
            next_lsn = recovery.next_lsn();
        }

        let writer = JournalWriter::open(path, sync_strategy, next_lsn)?;

        Ok(Self {
            journal: Mutex::new(JournalState { writer, retired }),
            records: RwLock::new(records),
            compaction_threshold,
        })
    }

    /// Open the journal for `list_key` inside `data_dir`
    pub fn open_in(
        data_dir: &Path,
        list_key: &str,
        sync_strategy: JournalSyncStrategy,
        compaction_threshold: u64,
    ) -> Result<Self> {
        Self::open(
            &Self::journal_path(data_dir, list_key),
            sync_strategy,
            compaction_threshold,
        )
    }

    /// Journal file for a list name
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced so any list name maps
    /// to a plain file name.
    pub fn journal_path(data_dir: &Path, list_key: &str) -> PathBuf {
        let name: String = list_key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        data_dir.join(format!("{}.journal", name))
    }

    /// Force the journal to disk
    pub fn sync(&self) -> Result<()> {
        self.journal.lock().writer.sync()
    }

    /// Rewrite the journal now, regardless of the threshold
    pub fn compact(&self) -> Result<()> {
        let mut journal = self.journal.lock();
        self.compact_locked(&mut journal)
    }

    /// Retired records still present in the journal
    pub fn retired(&self) -> u64 {
        self.journal.lock().retired
    }

    pub fn path(&self) -> PathBuf {
        self.journal.lock().writer.path().to_path_buf()
    }

    /// Rewrite the journal (called with the journal lock held)
    fn compact_locked(&self, journal: &mut JournalState) -> Result<()> {
        let records = self.records.read();
        journal.writer.rewrite(records.iter())?;
        tracing::debug!(
            "Compacted journal: {} retired dropped, {} live",
            journal.retired,
            records.len()
        );
        journal.retired = 0;
        Ok(())
    }

    /// Compact once enough records are retired
    ///
    /// Runs after the operation is already journaled and applied, so a failed
    /// rewrite is logged and retried on a later retirement rather than
    /// reported as a failure of that operation.
    fn maybe_compact(&self, journal: &mut JournalState) {
        if journal.retired < self.compaction_threshold {
            return;
        }
        if let Err(e) = self.compact_locked(journal) {
            tracing::warn!(
                "Journal compaction failed, {} retired records kept: {}",
                journal.retired,
                e
            );
        }
    }
}

impl ListBackend for FileList {
    fn push_tail(&self, record: &str) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.writer.append(JournalOp::Push {
            record: record.to_string(),
        })?;
        self.records.write().push_back(record.to_string());
        Ok(())
    }

    fn pop_head(&self) -> Result<Option<String>> {
        let mut journal = self.journal.lock();
        if self.records.read().is_empty() {
            return Ok(None);
        }

        journal.writer.append(JournalOp::PopHead)?;
        let popped = self.records.write().pop_front();
        journal.retired += 1;

        self.maybe_compact(&mut journal);
        Ok(popped)
    }

    fn length(&self) -> Result<u64> {
        Ok(self.records.read().len() as u64)
    }

    fn range(&self, start: i64, end: i64) -> Result<Vec<String>> {
        let records = self.records.read();
        Ok(match resolve_range(records.len(), start, end) {
            Some(window) => records.range(window).cloned().collect(),
            None => Vec::new(),
        })
    }

    fn delete_all(&self) -> Result<()> {
        let mut journal = self.journal.lock();
        journal.writer.append(JournalOp::Clear)?;

        let mut records = self.records.write();
        journal.retired += records.len() as u64;
        records.clear();
        drop(records);

        self.maybe_compact(&mut journal);
        Ok(())
    }
}
