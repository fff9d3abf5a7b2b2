//! Ordered List Module
//!
//! The only storage primitive the store relies on: a named list supporting
//! tail push, head pop, length, index-range reads and full delete.
//!
//! ## Index Addressing
//! ```text
//!   head                                    tail
//!   ┌──────┬──────┬──────┬─────┬──────┬──────┐
//!   │  0   │  1   │  2   │ ... │ n-2  │ n-1  │
//!   │ -n   │-n+1  │-n+2  │ ... │  -2  │  -1  │
//!   └──────┴──────┴──────┴─────┴──────┴──────┘
//! ```
//! Negative indices count back from the newest element. A start before the
//! oldest element clamps to the oldest; an end before the oldest element (or
//! a start past the newest) yields an empty range.
//!
//! ## Implementations
//! - `MemoryList`: in-process, lost on exit
//! - `FileList`: journaled to disk, replayed on open
//! - `RemoteList`: a list hosted by a `backlog-server`

mod memory;
mod file;
mod remote;

use std::ops::Range;
use std::sync::Arc;

use crate::error::Result;

pub use file::FileList;
pub use memory::MemoryList;
pub use remote::RemoteList;

/// Ordered-list primitives over a single named list
///
/// Each call is expected to be atomic on its own; nothing stronger is
/// assumed when several calls are composed.
pub trait ListBackend: Send + Sync {
    /// Append a record at the tail
    fn push_tail(&self, record: &str) -> Result<()>;

    /// Remove and return the oldest record, if any
    fn pop_head(&self) -> Result<Option<String>>;

    /// Current number of records
    fn length(&self) -> Result<u64>;

    /// Records between `start` and `end`, inclusive, oldest first
    fn range(&self, start: i64, end: i64) -> Result<Vec<String>>;

    /// Remove every record
    fn delete_all(&self) -> Result<()>;
}

impl<T: ListBackend + ?Sized> ListBackend for Arc<T> {
    fn push_tail(&self, record: &str) -> Result<()> {
        (**self).push_tail(record)
    }

    fn pop_head(&self) -> Result<Option<String>> {
        (**self).pop_head()
    }

    fn length(&self) -> Result<u64> {
        (**self).length()
    }

    fn range(&self, start: i64, end: i64) -> Result<Vec<String>> {
        (**self).range(start, end)
    }

    fn delete_all(&self) -> Result<()> {
        (**self).delete_all()
    }
}

impl<T: ListBackend + ?Sized> ListBackend for Box<T> {
    fn push_tail(&self, record: &str) -> Result<()> {
        (**self).push_tail(record)
    }

    fn pop_head(&self) -> Result<Option<String>> {
        (**self).pop_head()
    }

    fn length(&self) -> Result<u64> {
        (**self).length()
    }

    fn range(&self, start: i64, end: i64) -> Result<Vec<String>> {
        (**self).range(start, end)
    }

    fn delete_all(&self) -> Result<()> {
        (**self).delete_all()
    }
}

/// Resolve an inclusive, possibly negative index pair against a list of
/// `len` elements into a half-open range of absolute positions.
///
/// Returns `None` when the window selects nothing.
pub fn resolve_range(len: usize, start: i64, end: i64) -> Option<Range<usize>> {
    let len = len as i64;
    if len == 0 {
        return None;
    }

    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };

    if start > end || start >= len || end < 0 {
        return None;
    }

    Some(start as usize..end as usize + 1)
}
