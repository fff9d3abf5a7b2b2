//! Network Module
//!
//! TCP list service and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections (crossbeam channel hand-off)
//! - Commands routed through `ListService`

mod server;
mod connection;
mod service;

pub use connection::Connection;
pub use server::Server;
pub use service::{ListService, ListStorage};
