//! Cursor resolution and page assembly
//!
//! There is no key → position index. A cursor is located by reading
//! `limit`-sized windows backward from the tail until its key shows up, so
//! the cost grows with the cursor's distance from the tail. Cursors from
//! "next/previous page" navigation sit near the tail, which keeps this cheap
//! in practice.
//!
//! ## Windows
//! ```text
//!   ... │ -3l .. -2l-1 │ -2l .. -l-1 │ -l .. -1 │  ← tail
//!                 ◀──── resolution scans this way
//! ```
//! Once found at offset `f` of its window, a `before` page ends just above
//! the cursor (shift by `-(l - f)`) and an `after` page starts just below it
//! (shift by `f + 1`). The window length `l` is the page limit, capped at
//! `MAX_WINDOW`.

use std::collections::VecDeque;

use crate::entry::LogEntry;
use crate::error::Result;
use crate::list::ListBackend;

use super::{Cursor, PageQuery, Store};

/// Largest number of positions read per window; larger page limits are
/// filled over several windows
const MAX_WINDOW: usize = 1 << 16;

/// Inclusive from-tail index window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    /// The newest `limit` positions
    fn tail(limit: i64) -> Self {
        Self {
            start: -limit,
            end: -1,
        }
    }

    fn shifted(self, by: i64) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }

    /// Pull the end back onto the tail if it overshot
    fn clamped(self) -> Self {
        Self {
            start: self.start,
            end: self.end.min(-1),
        }
    }

    /// Whether the window starts at or past the tail
    fn past_tail(&self) -> bool {
        self.start >= 0
    }
}

impl<B: ListBackend> Store<B> {
    /// Fetch a page of entries, oldest first
    ///
    /// Without a cursor the page ends at the newest entry. A cursor whose key
    /// is no longer retained yields an empty page, not an error. Filtered-out
    /// entries never count toward the limit; more windows are read until the
    /// page is full or the list runs out.
    pub fn latest(&self, query: &PageQuery) -> Result<Vec<LogEntry>> {
        let limit = query.limit.unwrap_or(self.config.default_page_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let cursor = query.cursor.as_ref();
        let step = limit.min(MAX_WINDOW) as i64;

        let mut window = match self.find_location(cursor, step)? {
            Some(window) => window,
            None => return Ok(Vec::new()),
        };

        let direction = cursor.map_or(-1, Cursor::direction);
        let before = match cursor {
            Some(Cursor::Before(key)) => Some(key.as_str()),
            _ => None,
        };

        let mut results: VecDeque<LogEntry> = VecDeque::new();
        let mut fetches = 0usize;

        loop {
            let records = self.backend.range(window.start, window.end)?;
            fetches += 1;

            let mut batch = Vec::with_capacity(records.len());
            for record in &records {
                let Some(entry) = self.decode_record(record) else {
                    continue;
                };
                if before == Some(entry.key.as_str()) {
                    break;
                }
                if query.accepts(&entry) {
                    batch.push(entry);
                }
            }

            if direction < 0 {
                for entry in batch.into_iter().rev() {
                    results.push_front(entry);
                }
            } else {
                results.extend(batch);
            }

            window = window.shifted(step * direction).clamped();

            if records.is_empty() || results.len() >= limit || window.past_tail() {
                break;
            }
        }

        // Keep the entries nearest the starting point
        if direction < 0 {
            while results.len() > limit {
                results.pop_front();
            }
        } else {
            results.truncate(limit);
        }

        tracing::debug!(
            "Page of {} entries from {:?} after {} window reads",
            results.len(),
            self.config.list_key,
            fetches
        );

        Ok(results.into())
    }

    /// Resolve a cursor to the first window of its page
    ///
    /// `None` means the page is empty: the key was not found, or nothing lies
    /// on the requested side of it.
    pub(crate) fn find_location(&self, cursor: Option<&Cursor>, limit: i64) -> Result<Option<Window>> {
        let mut window = Window::tail(limit);

        let cursor = match cursor {
            Some(cursor) => cursor,
            None => return Ok(Some(window)),
        };
        let target = cursor.key();

        let mut found = None;
        loop {
            let records = self.backend.range(window.start, window.end)?;
            if records.is_empty() {
                break;
            }

            let position = records.iter().position(|record| {
                self.decode_record(record)
                    .map_or(false, |entry| entry.key == target)
            });

            // A short window was clipped at the head: its first record sits
            // `limit - len` positions after `window.start`
            let clipped = limit - records.len() as i64;

            if let Some(position) = position {
                found = Some(position as i64 + clipped);
                break;
            }
            if clipped > 0 {
                break;
            }

            window = window.shifted(-limit);
        }

        let found = match found {
            Some(found) => found,
            None => {
                tracing::debug!("Cursor {:?} not found in {:?}", target, self.config.list_key);
                return Ok(None);
            }
        };

        let offset = match cursor {
            Cursor::Before(_) => -(limit - found),
            Cursor::After(_) => found + 1,
        };

        let window = window.shifted(offset).clamped();
        if window.past_tail() {
            return Ok(None);
        }

        Ok(Some(window))
    }
}
