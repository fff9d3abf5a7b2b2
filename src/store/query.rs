//! Page queries
//!
//! What a caller asks `Store::latest` for: page size, an optional cursor,
//! and the filters an entry must pass to count toward the page.

use std::collections::HashSet;

use regex::Regex;

use crate::entry::{LogEntry, Severity};

/// Position of a page relative to a previously returned entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Entries older than the keyed entry
    Before(String),

    /// Entries newer than the keyed entry
    After(String),
}

impl Cursor {
    pub fn key(&self) -> &str {
        match self {
            Cursor::Before(key) | Cursor::After(key) => key,
        }
    }

    /// +1 when scanning toward the tail, -1 toward the head
    pub fn direction(&self) -> i64 {
        match self {
            Cursor::Before(_) => -1,
            Cursor::After(_) => 1,
        }
    }
}

/// Message filter
#[derive(Debug, Clone)]
pub enum Search {
    /// Plain substring containment
    Literal(String),

    /// Regular expression match anywhere in the message
    Pattern(Regex),
}

impl Search {
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Search::Literal(needle) => message.contains(needle.as_str()),
            Search::Pattern(re) => re.is_match(message),
        }
    }
}

impl From<&str> for Search {
    fn from(needle: &str) -> Self {
        Search::Literal(needle.to_string())
    }
}

impl From<Regex> for Search {
    fn from(re: Regex) -> Self {
        Search::Pattern(re)
    }
}

/// Parameters of one page request
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Page size; the store's default when unset
    pub limit: Option<usize>,

    /// Accepted severities; all when unset
    pub severities: Option<HashSet<Severity>>,

    pub cursor: Option<Cursor>,

    pub search: Option<Search>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only return entries with one of these severities
    pub fn severities<I: IntoIterator<Item = Severity>>(mut self, severities: I) -> Self {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    /// Page of entries older than `key`; replaces any earlier cursor
    pub fn before(mut self, key: impl Into<String>) -> Self {
        self.cursor = Some(Cursor::Before(key.into()));
        self
    }

    /// Page of entries newer than `key`; replaces any earlier cursor
    pub fn after(mut self, key: impl Into<String>) -> Self {
        self.cursor = Some(Cursor::After(key.into()));
        self
    }

    pub fn search(mut self, search: impl Into<Search>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether an entry passes the severity and search filters
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if let Some(severities) = &self.severities {
            if !severities.contains(&entry.severity) {
                return false;
            }
        }

        match &self.search {
            Some(search) => search.matches(&entry.message),
            None => true,
        }
    }
}
