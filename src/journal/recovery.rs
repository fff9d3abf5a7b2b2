//! Journal Recovery
//!
//! Replays the journal after a restart or crash.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{BacklogError, Result};

use super::{JournalEntry, JournalReader};

/// Handles journal recovery after crash
pub struct JournalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Bytes past the last valid entry (torn or corrupt tail)
    pub bytes_discarded: u64,

    /// Last valid LSN, if any entry was recovered
    pub last_lsn: Option<u64>,

    /// Whether the journal was truncated (partial writes removed)
    pub was_truncated: bool,
}

impl RecoveryResult {
    /// LSN the writer should continue from
    pub fn next_lsn(&self) -> u64 {
        self.last_lsn.map(|lsn| lsn + 1).unwrap_or(0)
    }
}

impl JournalRecovery {
    /// Recover entries from a journal file
    ///
    /// This will:
    /// 1. Read entries until the end or the first bad frame
    /// 2. Truncate the file at the last valid entry
    /// 3. Return all valid entries in order
    pub fn recover(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let (entries, result) = Self::scan(path)?;

        if result.bytes_discarded > 0 {
            let file = OpenOptions::new().write(true).open(path)?;
            let valid_len = file.metadata()?.len() - result.bytes_discarded;
            file.set_len(valid_len)?;
            file.sync_all()?;

            tracing::warn!(
                "Journal {} truncated to {} bytes ({} bytes discarded)",
                path.display(),
                valid_len,
                result.bytes_discarded
            );

            return Ok((
                entries,
                RecoveryResult {
                    was_truncated: true,
                    ..result
                },
            ));
        }

        Ok((entries, result))
    }

    /// Verify integrity of a journal file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let file_len = std::fs::metadata(path)?.len();
        let mut reader = JournalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    result.last_lsn = Some(entry.lsn);
                    entries.push(entry);
                }
                Ok(None) => break,
                Err(BacklogError::JournalCorruption(reason)) => {
                    tracing::warn!("Journal {}: {}", path.display(), reason);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        result.bytes_discarded = file_len - reader.offset();
        Ok((entries, result))
    }
}
