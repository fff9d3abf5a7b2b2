//! Journal Writer
//!
//! Handles appending entries to the journal file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::JournalSyncStrategy;
use crate::error::{BacklogError, Result};

use super::{JournalEntry, JournalOp};

/// Writes entries to the journal file
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    next_lsn: u64,
    sync_strategy: JournalSyncStrategy,
    /// Entries written since the last fsync
    unsynced: usize,
}

impl JournalWriter {
    /// Open or create a journal file for appending
    ///
    /// `next_lsn` continues the sequence found by recovery.
    pub fn open(path: &Path, sync_strategy: JournalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append an operation, returning its LSN
    pub fn append(&mut self, op: JournalOp) -> Result<u64> {
        let lsn = self.next_lsn;
        let frame = JournalEntry::new(lsn, op).serialize()?;

        self.writer
            .write_all(&frame)
            .map_err(|e| BacklogError::JournalWrite(format!("lsn {}: {}", lsn, e)))?;
        self.next_lsn += 1;
        self.unsynced += 1;

        match self.sync_strategy {
            JournalSyncStrategy::EveryWrite => self.sync()?,
            JournalSyncStrategy::EveryNEntries { count } => {
                if self.unsynced >= count {
                    self.sync()?;
                } else {
                    self.writer.flush()?;
                }
            }
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Replace the journal with one `Push` per live record
    ///
    /// The snapshot is written beside the journal and renamed over it, so a
    /// crash mid-rewrite leaves the previous journal intact.
    pub fn rewrite<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.sync()?;

        let tmp_path = self.path.with_extension("journal.tmp");
        let mut lsn = self.next_lsn;
        {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            let mut tmp = BufWriter::new(file);
            for record in records {
                let frame = JournalEntry::new(
                    lsn,
                    JournalOp::Push {
                        record: record.clone(),
                    },
                )
                .serialize()?;
                tmp.write_all(&frame)?;
                lsn += 1;
            }
            tmp.flush()?;
            tmp.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        self.next_lsn = lsn;
        self.unsynced = 0;

        tracing::debug!("Journal {} rewritten, next lsn {}", self.path.display(), lsn);
        Ok(())
    }

    /// LSN the next append will receive
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
