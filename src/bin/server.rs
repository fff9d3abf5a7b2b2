//! Backlog Server Binary
//!
//! Serves named ordered lists over TCP.

use std::sync::Arc;

use backlog::config::JournalSyncStrategy;
use backlog::network::{ListService, Server};
use backlog::Config;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Backlog list server
#[derive(Parser, Debug)]
#[command(name = "backlog-server")]
#[command(about = "Ordered-list service backing Backlog stores")]
#[command(version)]
struct Args {
    /// Data directory for journaled lists
    #[arg(short, long, default_value = "./backlog_data")]
    data_dir: String,

    /// Keep lists in memory only (nothing is written to disk)
    #[arg(long)]
    memory: bool,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "16")]
    workers: usize,

    /// fsync the journal after every write instead of every 100
    #[arg(long)]
    sync_every_write: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,backlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Backlog Server v{}", backlog::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers);
    if args.sync_every_write {
        builder = builder.journal_sync_strategy(JournalSyncStrategy::EveryWrite);
    }
    let config = builder.build();

    let service = if args.memory {
        tracing::info!("Lists are held in memory");
        ListService::in_memory()
    } else {
        tracing::info!("Data directory: {}", args.data_dir);
        ListService::journaled(&config)
    };

    let server = match Server::bind(config, Arc::new(service)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
