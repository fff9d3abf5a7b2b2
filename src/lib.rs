//! # Backlog
//!
//! A capacity-bounded log entry store with:
//! - FIFO eviction once `max_backlog` entries are retained
//! - Cursor-based (keyset) pagination without a secondary index
//! - Severity and message filters applied before page limits
//! - Pluggable ordered-list backends (memory, journaled file, TCP service)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Producers / Consumers                       │
//! │          report(..)              latest(query)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                │
//! │   gating · eviction · cursor resolution · page assembly     │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │ encode / decode              │ push · pop · len
//!            ▼                              │ range · delete
//!   ┌─────────────────┐                     ▼
//!   │  Entry Codec    │          ┌─────────────────────┐
//!   │  (JSON records) │          │    ListBackend      │
//!   └─────────────────┘          └──┬────────┬───────┬─┘
//!                                   │        │       │
//!                                   ▼        ▼       ▼
//!                              MemoryList FileList RemoteList ──▶ backlog-server
//!                                         (journal)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod entry;
pub mod journal;
pub mod list;
pub mod store;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use entry::{LogEntry, Severity};
pub use error::{BacklogError, Result};
pub use list::ListBackend;
pub use store::{PageQuery, ReportOptions, Search, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Backlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
