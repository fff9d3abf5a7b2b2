//! Journal Reader
//!
//! Sequentially reads framed entries from a journal file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{BacklogError, Result};

use super::entry::{JournalEntry, HEADER_SIZE};

/// Reads entries from a journal file, front to back
pub struct JournalReader {
    reader: BufReader<File>,

    /// Byte offset just past the last entry returned
    offset: u64,
}

impl JournalReader {
    /// Open a journal file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            offset: 0,
        })
    }

    /// Read the next entry
    ///
    /// Returns:
    /// - `Ok(Some(entry))` — a complete, checksummed entry
    /// - `Ok(None)` — clean end of file
    /// - `Err(JournalCorruption)` — torn or corrupt frame at `offset()`
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        match self.read_full(&mut header)? {
            0 => return Ok(None),
            n if n < HEADER_SIZE => {
                return Err(BacklogError::JournalCorruption(format!(
                    "torn header at offset {}: {} of {} bytes",
                    self.offset, n, HEADER_SIZE
                )))
            }
            _ => {}
        }

        let (lsn, crc, data_len) = JournalEntry::parse_header(&header)?;

        let mut data = vec![0u8; data_len];
        let read = self.read_full(&mut data)?;
        if read < data_len {
            return Err(BacklogError::JournalCorruption(format!(
                "torn entry at offset {}: {} of {} data bytes",
                self.offset, read, data_len
            )));
        }

        let entry = JournalEntry::from_parts(lsn, crc, &data)?;
        self.offset += (HEADER_SIZE + data_len) as u64;
        Ok(Some(entry))
    }

    /// Byte offset just past the last valid entry
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Fill `buf` as far as the file allows, returning bytes read
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl Iterator for JournalReader {
    type Item = Result<JournalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
