//! Remote list
//!
//! Client side of the list service: each primitive is one request/response
//! round trip over a persistent TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{BacklogError, Result};
use crate::protocol::{decode_records, read_response, write_command, Command, Response, Status};

use super::ListBackend;

/// A named list hosted by a `backlog-server`
pub struct RemoteList {
    /// Name of the list on the server
    key: String,

    /// Request/response pairs must not interleave
    conn: Mutex<Conn>,
}

struct Conn {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl RemoteList {
    /// Connect to a list service and bind to list `key`
    pub fn connect(addr: impl ToSocketAddrs, key: impl Into<String>) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| BacklogError::Network(format!("connect failed: {}", e)))?;
        Self::from_stream(stream, key)
    }

    /// Wrap an established connection
    pub fn from_stream(stream: TcpStream, key: impl Into<String>) -> Result<Self> {
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            key: key.into(),
            conn: Mutex::new(Conn {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(stream),
            }),
        })
    }

    /// Configure socket timeouts (0 = none)
    pub fn set_timeouts(&self, read_ms: u64, write_ms: u64) -> Result<()> {
        let conn = self.conn.lock();
        let to_duration = |ms: u64| if ms > 0 { Some(Duration::from_millis(ms)) } else { None };
        conn.reader.get_ref().set_read_timeout(to_duration(read_ms))?;
        conn.writer.get_ref().set_write_timeout(to_duration(write_ms))?;
        Ok(())
    }

    /// Health check
    pub fn ping(&self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        match response.body() {
            b"PONG" => Ok(()),
            other => Err(BacklogError::Protocol(format!(
                "unexpected PING reply: {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Send one command and wait for its response
    ///
    /// ERROR responses become `Backend` errors.
    fn call(&self, command: &Command) -> Result<Response> {
        let mut conn = self.conn.lock();
        write_command(&mut conn.writer, command)?;
        let response = read_response(&mut conn.reader)?;

        if response.status == Status::Error {
            return Err(BacklogError::Backend(
                String::from_utf8_lossy(response.body()).into_owned(),
            ));
        }
        Ok(response)
    }
}

impl ListBackend for RemoteList {
    fn push_tail(&self, record: &str) -> Result<()> {
        self.call(&Command::Push {
            key: self.key.clone(),
            record: record.to_string(),
        })?;
        Ok(())
    }

    fn pop_head(&self) -> Result<Option<String>> {
        let response = self.call(&Command::Pop {
            key: self.key.clone(),
        })?;

        match response.status {
            Status::NotFound => Ok(None),
            _ => String::from_utf8(response.body().to_vec())
                .map(Some)
                .map_err(|e| BacklogError::Protocol(format!("POP reply: {}", e))),
        }
    }

    fn length(&self) -> Result<u64> {
        let response = self.call(&Command::Len {
            key: self.key.clone(),
        })?;

        let body: [u8; 8] = response.body().try_into().map_err(|_| {
            BacklogError::Protocol(format!(
                "LEN reply: expected 8 bytes, got {}",
                response.body().len()
            ))
        })?;
        Ok(u64::from_be_bytes(body))
    }

    fn range(&self, start: i64, end: i64) -> Result<Vec<String>> {
        let response = self.call(&Command::Range {
            key: self.key.clone(),
            start,
            end,
        })?;
        decode_records(response.body())
    }

    fn delete_all(&self) -> Result<()> {
        self.call(&Command::Del {
            key: self.key.clone(),
        })?;
        Ok(())
    }
}
