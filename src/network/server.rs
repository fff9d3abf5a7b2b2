//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::error::{BacklogError, Result};
use crate::protocol::{write_response, Response};

use super::{Connection, ListService};

/// Pause between accept polls while idle
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for the list service
///
/// The acceptor polls a non-blocking listener so it can notice shutdown;
/// accepted streams are queued on a bounded channel drained by a fixed pool
/// of workers. When the queue is full the connection is refused with an
/// ERROR response.
pub struct Server {
    config: Config,
    service: Arc<ListService>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: Config, service: Arc<ListService>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            BacklogError::Network(format!("bind {} failed: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            service,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start serving (blocking until `shutdown`)
    pub fn run(&self) -> Result<()> {
        let workers = self.config.worker_threads.max(1);
        let queue = self.config.max_connections.saturating_sub(workers).max(1);
        let (tx, rx) = channel::bounded::<TcpStream>(queue);

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<std::io::Result<_>>()?;
        drop(rx);

        tracing::info!(
            "Listening on {} ({} workers, queue {})",
            self.local_addr()?,
            workers,
            queue
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    match tx.try_send(stream) {
                        Ok(()) => tracing::trace!("Queued connection from {}", addr),
                        Err(TrySendError::Full(mut stream)) => {
                            tracing::warn!("Connection limit reached, refusing {}", addr);
                            let _ = write_response(
                                &mut stream,
                                &Response::error("too many connections"),
                            );
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(BacklogError::Network(
                                "worker pool exited unexpectedly".to_string(),
                            ));
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(tx);
        for handle in handles {
            let _ = handle.join();
        }

        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> std::io::Result<JoinHandle<()>> {
        let service = Arc::clone(&self.service);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("backlog-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let result = Connection::new(stream, Arc::clone(&service)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = result {
                        tracing::warn!("Connection ended with error: {}", e);
                    }
                }
            })
    }
}
