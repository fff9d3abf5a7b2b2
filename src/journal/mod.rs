//! Journal Module
//!
//! Append-only operation log behind `FileList`.
//!
//! ## Responsibilities
//! - Append list mutations before they are applied in memory
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Replay on open, truncating torn tails
//! - Rewrite as a snapshot once popped records pile up
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! `Data` is the bincode encoding of a `JournalOp`; the CRC covers the LSN
//! bytes and `Data`.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{JournalEntry, JournalOp, HEADER_SIZE, MAX_DATA_SIZE};
pub use reader::JournalReader;
pub use recovery::{JournalRecovery, RecoveryResult};
pub use writer::JournalWriter;
