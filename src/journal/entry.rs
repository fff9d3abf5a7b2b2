//! Journal entry definitions
//!
//! Defines the structure and framing of individual journal entries.

use serde::{Deserialize, Serialize};

use crate::error::{BacklogError, Result};

/// Frame header: LSN (8) + CRC (4) + data length (4)
pub const HEADER_SIZE: usize = 16;

/// Largest accepted data section (16 MB); anything bigger is corruption
pub const MAX_DATA_SIZE: u32 = 16 * 1024 * 1024;

/// A single framed entry in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The list mutation
    pub op: JournalOp,
}

/// List mutations that can be journaled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalOp {
    /// Append a record at the tail
    Push { record: String },

    /// Drop the oldest record
    PopHead,

    /// Drop every record
    Clear,
}

impl JournalEntry {
    pub fn new(lsn: u64, op: JournalOp) -> Self {
        Self { lsn, op }
    }

    /// Frame the entry: header followed by the encoded operation
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(&self.op)
            .map_err(|e| BacklogError::Serialization(e.to_string()))?;

        if data.len() > MAX_DATA_SIZE as usize {
            return Err(BacklogError::JournalWrite(format!(
                "entry too large: {} bytes (max {})",
                data.len(),
                MAX_DATA_SIZE
            )));
        }

        let crc = Self::checksum(self.lsn, &data);

        let mut frame = Vec::with_capacity(HEADER_SIZE + data.len());
        frame.extend_from_slice(&self.lsn.to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&(data.len() as u32).to_le_bytes());
        frame.extend_from_slice(&data);
        Ok(frame)
    }

    /// Parse one complete frame, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(BacklogError::JournalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let (lsn, crc, data_len) = Self::parse_header(&bytes[..HEADER_SIZE])?;

        let total_len = HEADER_SIZE + data_len;
        if bytes.len() < total_len {
            return Err(BacklogError::JournalCorruption(format!(
                "incomplete entry: expected {} bytes, got {}",
                total_len,
                bytes.len()
            )));
        }

        Self::from_parts(lsn, crc, &bytes[HEADER_SIZE..total_len])
    }

    /// Split a header into (lsn, crc, data length)
    pub(super) fn parse_header(header: &[u8]) -> Result<(u64, u32, usize)> {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&header[0..8]);
        crc.copy_from_slice(&header[8..12]);
        len.copy_from_slice(&header[12..16]);

        let data_len = u32::from_le_bytes(len);
        if data_len > MAX_DATA_SIZE {
            return Err(BacklogError::JournalCorruption(format!(
                "entry length {} exceeds maximum {}",
                data_len, MAX_DATA_SIZE
            )));
        }

        Ok((u64::from_le_bytes(lsn), u32::from_le_bytes(crc), data_len as usize))
    }

    /// Verify the checksum and decode the operation
    pub(super) fn from_parts(lsn: u64, crc: u32, data: &[u8]) -> Result<Self> {
        let actual = Self::checksum(lsn, data);
        if actual != crc {
            return Err(BacklogError::JournalCorruption(format!(
                "checksum mismatch at lsn {}: expected {:08x}, got {:08x}",
                lsn, crc, actual
            )));
        }

        let op = bincode::deserialize(data)
            .map_err(|e| BacklogError::JournalCorruption(format!("lsn {}: {}", lsn, e)))?;

        Ok(Self { lsn, op })
    }

    fn checksum(lsn: u64, data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&lsn.to_le_bytes());
        hasher.update(data);
        hasher.finalize()
    }
}
