//! In-memory list
//!
//! VecDeque wrapped in RwLock: many concurrent range readers, one mutator.

use std::collections::VecDeque;

use parking_lot::RwLock;

use crate::error::Result;

use super::{resolve_range, ListBackend};

/// Volatile ordered list
#[derive(Debug, Default)]
pub struct MemoryList {
    records: RwLock<VecDeque<String>>,
}

impl MemoryList {
    /// Create a new empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list pre-filled with records, oldest first
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: RwLock::new(records.into_iter().map(Into::into).collect()),
        }
    }

    /// Copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.records.read().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ListBackend for MemoryList {
    fn push_tail(&self, record: &str) -> Result<()> {
        self.records.write().push_back(record.to_string());
        Ok(())
    }

    fn pop_head(&self) -> Result<Option<String>> {
        Ok(self.records.write().pop_front())
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
        self.records.write().clear();
        Ok(())
    }
}
